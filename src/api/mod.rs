pub mod auth;
pub mod dashboard;
pub mod early_access;
pub mod health;
pub mod plaid;
pub mod swagger;
