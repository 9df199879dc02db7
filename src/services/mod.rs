pub mod admin_service;
pub mod auth_service;
pub mod customer_service;
pub mod professional_service;
