//! Bearer authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::User;
use crate::errors::AppError;

/// Authenticated principal, resolved once per request and handed to
/// handlers through `Extension<CurrentUser>`.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
}

impl CurrentUser {
    pub fn is_super_admin(&self) -> bool {
        self.user.is_super_admin()
    }
}

/// Resolve the bearer token to a stored, non-deleted user and attach it
/// to the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .ok_or(AppError::Unauthorized)?;

    let user = state.auth_service.resolve_current_user(token).await?;

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

/// Require the elevated role, returns Forbidden otherwise.
pub fn require_super_admin(current: &CurrentUser) -> Result<(), AppError> {
    if current.is_super_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
