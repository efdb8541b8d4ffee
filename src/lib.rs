//! Account service - user profile and account lifecycle API.
//!
//! Authenticated users can read their profile, change their password and
//! deactivate their own account. Deactivation hands back a single-use
//! reactivation link. Super admins can look up and soft delete accounts.
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: `serve`, `migrate` and `create-user`
//! - **config**: environment configuration and constants
//! - **domain**: users, roles, statuses and password hashing
//! - **infra**: database, migrations, repositories and unit of work
//! - **services**: authentication and account use cases
//! - **api**: handlers, middleware, extractors and routes
//! - **types**: the response envelope
//! - **errors**: the error taxonomy and its HTTP mapping
//!
//! # CLI Usage
//!
//! ```bash
//! cargo run -- migrate up
//! cargo run -- create-user --email admin@example.com --name Admin --password secret --super-admin
//! cargo run -- serve
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

pub use api::{create_router, AppState};
pub use config::Config;
pub use domain::{Password, User, UserRole, UserStatus};
pub use errors::{AppError, AppResult};
