pub mod analytics;
pub mod audit;
pub mod auth;
pub mod documents;
pub mod energy;
pub mod reports;
pub mod users;
pub mod work_orders;
pub mod work_requests;
