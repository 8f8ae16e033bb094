pub mod user_repo;
pub use user_repo::UserRepository;
pub mod stock_repo;
pub use stock_repo::StockRepository;
pub mod movement_repo;
pub use movement_repo::MovementRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod stock_ledger;
pub use stock_ledger::PgStockLedger;

#[cfg(test)]
pub mod testing;
