pub mod auth;
pub mod clients;
pub mod firms;
pub mod ledger;
pub mod orders;
pub mod sales;
pub mod workers;
