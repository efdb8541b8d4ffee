//! Domain layer - account entities and value objects.
//!
//! Free of infrastructure concerns; persistence models convert into these
//! types at the repository boundary.

pub mod password;
pub mod user;

pub use password::Password;
pub use user::{Deactivation, User, UserAuditResponse, UserResponse, UserRole, UserStatus};
