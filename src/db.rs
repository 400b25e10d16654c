pub mod user_repo;
pub use user_repo::UserRepository;
pub mod work_request_repo;
pub use work_request_repo::WorkRequestRepository;
pub mod work_order_repo;
pub use work_order_repo::WorkOrderRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod energy_repo;
pub use energy_repo::EnergyRepository;
pub mod document_repo;
pub use document_repo::DocumentRepository;
pub mod analytics_repo;
pub use analytics_repo::AnalyticsRepository;
