pub mod auth;
pub mod crm;
pub mod inventory;
pub mod movements;
pub mod users;
