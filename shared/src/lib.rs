//! Shared types for the coral-market backend
//!
//! Common types used across crates: error codes and the API response
//! envelope, domain models, and small utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};
