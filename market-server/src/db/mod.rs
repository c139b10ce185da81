//! Database access layer

pub mod carts;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod users;
