//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_SUPER_ADMIN, ROLE_USER, STATUS_ACTIVE, STATUS_DELETED, STATUS_INACTIVE};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    SuperAdmin,
}

impl UserRole {
    /// Check if this role is an elevated principal
    pub fn is_super_admin(&self) -> bool {
        matches!(self, UserRole::SuperAdmin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => ROLE_SUPER_ADMIN,
            UserRole::User => ROLE_USER,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_SUPER_ADMIN => UserRole::SuperAdmin,
            _ => UserRole::User,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account lifecycle status.
///
/// `Deleted` is terminal for this service: rows are kept for audit but
/// normal lookups never return them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Deleted,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => STATUS_ACTIVE,
            UserStatus::Inactive => STATUS_INACTIVE,
            UserStatus::Deleted => STATUS_DELETED,
        }
    }
}

impl From<&str> for UserStatus {
    fn from(s: &str) -> Self {
        match s {
            STATUS_ACTIVE => UserStatus::Active,
            STATUS_DELETED => UserStatus::Deleted,
            // Unknown values fail closed
            _ => UserStatus::Inactive,
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub is_verified: bool,
    pub status: UserStatus,
    #[serde(skip_serializing)]
    pub reactivation_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp, kept for audit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new active user with the given role
    pub fn new(id: Uuid, email: String, password_hash: String, name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            password_hash,
            name,
            role,
            is_verified: false,
            status: UserStatus::Active,
            reactivation_token: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn is_deleted(&self) -> bool {
        self.status == UserStatus::Deleted
    }
}

/// Caller-supplied justification for deactivating an account
#[derive(Debug, Clone, Default)]
pub struct Deactivation {
    pub reason: Option<String>,
    pub confirmation: bool,
}

/// Public view of a user (safe to return to the user themselves)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User display name
    #[schema(example = "John Doe")]
    pub name: String,
    /// Whether the account is currently active
    pub is_active: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            is_active: user.is_active(),
            created_at: user.created_at,
        }
    }
}

/// Administrative view of a user, including lifecycle fields
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserAuditResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<User> for UserAuditResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            status: user.status,
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
            deleted_at: user.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new(
            Uuid::new_v4(),
            "test@example.com".to_string(),
            "$argon2id$secret".to_string(),
            "Test User".to_string(),
            UserRole::User,
        )
    }

    #[test]
    fn test_status_round_trips_through_column_value() {
        for status in [UserStatus::Active, UserStatus::Inactive, UserStatus::Deleted] {
            assert_eq!(UserStatus::from(status.as_str()), status);
        }
    }

    #[test]
    fn test_unknown_status_is_not_active() {
        assert_eq!(UserStatus::from("suspended"), UserStatus::Inactive);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(UserRole::from("super_admin"), UserRole::SuperAdmin);
        assert_eq!(UserRole::from("user"), UserRole::User);
        assert_eq!(UserRole::from("admin"), UserRole::User);
    }

    #[test]
    fn test_public_view_hides_internal_fields() {
        let user = sample_user();
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        let obj = json.as_object().unwrap();

        assert!(obj.contains_key("email"));
        assert_eq!(obj["is_active"], true);
        for hidden in ["password_hash", "role", "is_verified", "status", "updated_at", "deleted_at"] {
            assert!(!obj.contains_key(hidden), "{} leaked", hidden);
        }
    }

    #[test]
    fn test_entity_serialization_skips_credentials() {
        let mut user = sample_user();
        user.reactivation_token = Some("abc".to_string());
        let json = serde_json::to_string(&user).unwrap();

        assert!(!json.contains("argon2"));
        assert!(!json.contains("reactivation_token"));
    }
}
