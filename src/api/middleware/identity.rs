//! Caller-identity middleware.
//!
//! Real authentication is an upstream collaborator (session gateway);
//! this layer extracts `X-User-Id`, checks the user exists, and injects
//! `UserContext` into request extensions for downstream handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db::repository;

pub async fn require_identity(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_identity_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_identity_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    // 1. Extract and parse the caller id
    let raw = req
        .headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::BadRequest("X-User-Id header required".into()))?;

    let user_id = Uuid::parse_str(raw)
        .map_err(|e| ApiError::BadRequest(format!("Invalid X-User-Id: {e}")))?;

    // 2. Resolve against the users table
    let display_name = {
        let conn = ctx.core.open_db()?;
        repository::get_user(&conn, &user_id)
            .map_err(ApiError::from)?
            .map(|u| u.display_name)
            .ok_or(ApiError::Forbidden("unknown user".into()))?
    }; // connection released here, before the handler runs

    // 3. Inject caller context for downstream handlers
    req.extensions_mut().insert(UserContext {
        user_id,
        display_name,
    });

    Ok(next.run(req).await)
}
