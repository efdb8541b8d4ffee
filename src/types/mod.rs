//! Shared HTTP response types.

mod response;

pub use response::{ApiResponse, NoContent};
