use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Silverline";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the HTTP API.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8700";

/// Get the application data directory.
/// ~/Silverline/ on all platforms, overridable via SILVERLINE_DATA_DIR.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SILVERLINE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Silverline")
}

/// Path of the community database file.
pub fn database_path() -> PathBuf {
    app_data_dir().join("silverline.db")
}

/// Socket address the API server binds to (SILVERLINE_ADDR override).
pub fn bind_addr() -> SocketAddr {
    std::env::var("SILVERLINE_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| DEFAULT_ADDR.parse().expect("default addr parses"))
}

/// Base URL of the external video-room provider. Meetings store only a
/// room name; the provider consumes it via this URL.
pub fn meeting_base_url() -> String {
    std::env::var("SILVERLINE_MEETING_BASE_URL")
        .unwrap_or_else(|_| "https://meet.silverline.example".to_string())
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "silverline=info,tower_http=info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_under_data_dir() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("silverline.db"));
    }

    #[test]
    fn default_addr_parses() {
        let addr: SocketAddr = DEFAULT_ADDR.parse().unwrap();
        assert_eq!(addr.port(), 8700);
    }

    #[test]
    fn app_name_is_silverline() {
        assert_eq!(APP_NAME, "Silverline");
    }

    #[test]
    fn meeting_url_has_scheme() {
        assert!(meeting_base_url().starts_with("https://"));
    }
}
