//! Command-line interface: `serve`, `migrate` and `create-user`.

pub mod args;

pub use args::{Cli, Commands};
