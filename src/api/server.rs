//! API server lifecycle — binds the listener and serves the router.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::router::api_router;
use crate::core_state::CoreState;

/// Bind `addr` and serve the API until the process is stopped.
pub async fn serve(core: Arc<CoreState>, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(%local, "Silverline API listening");

    axum::serve(listener, api_router(core)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let tmp = tempfile::tempdir().unwrap();
        let core = Arc::new(CoreState::with_db_path(tmp.path().join("test.db")));
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

        // serve() runs forever; just confirm the bind phase works
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        let local = listener.local_addr().unwrap();
        assert_ne!(local.port(), 0);
        drop(listener);
        drop(core);
    }
}
