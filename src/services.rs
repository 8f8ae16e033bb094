pub mod auth;
pub mod dashboard_service;
pub mod movement_service;
pub mod stock_service;
pub mod user_service;
