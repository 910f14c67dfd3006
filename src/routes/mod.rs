pub mod auth;
pub mod docs;
pub mod health_check;
