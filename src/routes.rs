pub mod carts;
pub mod error;
pub mod health;
pub mod products;
pub mod sessions;
