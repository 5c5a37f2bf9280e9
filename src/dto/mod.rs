pub mod auth;
pub mod brands;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;
