//! User account handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_super_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{Deactivation, UserAuditResponse, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::types::{ApiResponse, NoContent};

/// Account deactivation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeactivateUserRequest {
    /// Optional free-text reason
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    #[schema(example = "Taking a break")]
    pub reason: Option<String>,
    /// Must be true to proceed
    #[serde(default)]
    #[schema(example = true)]
    pub confirmation: bool,
}

impl From<DeactivateUserRequest> for Deactivation {
    fn from(request: DeactivateUserRequest) -> Self {
        Self {
            reason: request.reason,
            confirmation: request.confirmation,
        }
    }
}

/// Deactivation result
#[derive(Debug, Serialize, ToSchema)]
pub struct DeactivationResponse {
    #[schema(example = "http://localhost:3000/users/reactivation?token=5f0c...")]
    pub reactivation_link: String,
}

/// Reactivation query string
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReactivationQuery {
    /// Token from the reactivation link
    pub token: Option<String>,
}

/// Password change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Routes that require an authenticated principal
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_current_user))
        .route("/me/password", patch(change_password))
        .route("/deactivation", post(deactivate_account))
        .route("/:id", get(get_user).delete(delete_user))
}

/// Routes reachable without credentials
pub fn public_user_routes() -> Router<AppState> {
    Router::new().route("/reactivation", get(reactivate_account))
}

fn parse_user_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::validation("Invalid user ID"))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User details retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResponse<UserResponse> {
    ApiResponse::success(
        "User details retrieved successfully",
        state.user_service.get_current_user(&current.user),
    )
}

/// Deactivate the caller's account
#[utoipa::path(
    post,
    path = "/users/deactivation",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = DeactivateUserRequest,
    responses(
        (status = 200, description = "User deactivation successful", body = DeactivationResponse),
        (status = 400, description = "Confirmation missing or account already inactive"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn deactivate_account(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<DeactivateUserRequest>,
) -> AppResult<ApiResponse<DeactivationResponse>> {
    let reactivation_link = state
        .user_service
        .deactivate(&current.user, payload.into())
        .await?;

    Ok(ApiResponse::success(
        "User deactivation successful",
        DeactivationResponse { reactivation_link },
    ))
}

/// Reactivate an account with a single-use token
#[utoipa::path(
    get,
    path = "/users/reactivation",
    tag = "Users",
    params(ReactivationQuery),
    responses(
        (status = 200, description = "User reactivation successful"),
        (status = 400, description = "Token missing"),
        (status = 404, description = "Token unknown or already used")
    )
)]
pub async fn reactivate_account(
    State(state): State<AppState>,
    Query(query): Query<ReactivationQuery>,
) -> AppResult<ApiResponse<()>> {
    let token = query.token.unwrap_or_default();
    state.user_service.reactivate(&token).await?;

    Ok(ApiResponse::message("User reactivation successful"))
}

/// Change the caller's password
#[utoipa::path(
    patch,
    path = "/users/me/password",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed successfully"),
        (status = 400, description = "Validation error or incorrect old password"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .user_service
        .change_password(&payload.old_password, &payload.new_password, &current.user)
        .await?;

    Ok(ApiResponse::message("Password changed successfully"))
}

/// Get any user by ID, including soft-deleted (super admin only)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = UserAuditResponse),
        (status = 400, description = "Invalid user ID"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - super admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserAuditResponse>> {
    require_super_admin(&current)?;
    let id = parse_user_id(&id)?;

    let user = state.user_service.get_user_for_audit(id).await?;

    Ok(ApiResponse::success(
        "User retrieved successfully",
        UserAuditResponse::from(user),
    ))
}

/// Soft delete a user (super admin only, cannot delete self)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 400, description = "Invalid user ID or own account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - super admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<NoContent> {
    require_super_admin(&current)?;
    let id = parse_user_id(&id)?;

    if current.user.id == id {
        return Err(AppError::validation("Cannot delete your own account"));
    }

    state.user_service.soft_delete(id).await?;

    Ok(NoContent)
}
