pub mod auth_service;
pub mod dashboard_service;
pub mod early_access_service;
pub mod email_service;
pub mod plaid_service;
pub mod snapshot_service;

pub use dashboard_service::*;
pub use email_service::*;
pub use plaid_service::*;
