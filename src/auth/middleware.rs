use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::AppState;

/// The resolved owner identity for the current request. Everything the API
/// stores or queries is scoped by this id.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub google_user_id: String,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let token_data = verify_token(token, &state.config)?;

    // A token without a usable subject claim resolves no owner.
    if token_data.claims.sub.is_empty() {
        return Err(AppError::Unauthorized);
    }

    let auth_user = AuthUser {
        google_user_id: token_data.claims.sub,
    };

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}
