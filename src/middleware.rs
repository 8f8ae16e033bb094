pub mod auth;
pub mod fingerprint;
pub mod rbac;
