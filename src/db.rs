pub mod user_repo;
pub use user_repo::UserRepository;
pub mod ledger_repo;
pub use ledger_repo::LedgerRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod firm_repo;
pub use firm_repo::FirmRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod sale_repo;
pub use sale_repo::SaleRepository;
pub mod worker_repo;
pub use worker_repo::WorkerRepository;
