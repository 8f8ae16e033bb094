pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod inventory;
