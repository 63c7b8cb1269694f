pub mod auth;
pub mod clients;
pub mod firms;
pub mod orders;
pub mod products;
pub mod sales;
pub mod workers;
