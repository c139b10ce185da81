//! Data models
//!
//! Shared between the server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `Uuid`; timestamps are UNIX milliseconds (`i64`).

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

// Re-exports
pub use cart::*;
pub use order::*;
pub use product::*;
pub use user::*;
