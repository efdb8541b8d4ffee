//! Configuration: environment-driven settings plus the named constants
//! shared by the account endpoints (roles, statuses, defaults).

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
