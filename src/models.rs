pub mod analytics;
pub mod audit;
pub mod auth;
pub mod document;
pub mod energy;
pub mod work_order;
pub mod work_request;
