pub mod auth;
pub mod ledger;
pub mod payroll;
pub mod payroll_sweep;
pub mod image_store;
pub mod client_service;
pub mod firm_service;
pub mod order_service;
pub mod sale_service;
pub mod worker_service;
