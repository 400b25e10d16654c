pub mod analytics_service;
pub mod auth;
pub mod document_service;
pub mod effects;
pub mod energy_service;
pub mod lifecycle;
pub mod mailer;
pub mod user_service;
pub mod work_order_service;
pub mod work_request_service;
