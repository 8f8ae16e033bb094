pub mod auth;
pub mod dashboard;
pub mod inventory;
pub mod users;
