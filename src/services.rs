pub mod audit;
pub mod auth;
pub mod crm_service;
pub mod inventory_service;
pub mod movement_service;
pub mod refdata;
pub mod user_service;

pub use audit::AuditTrail;
pub use auth::AuthService;
pub use crm_service::CrmService;
pub use inventory_service::InventoryService;
pub use movement_service::MovementService;
pub use user_service::UserService;
