pub mod audit_logs;
pub mod customers;
pub mod service_professionals;
pub mod service_requests;
pub mod services;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use customers::Entity as Customers;
pub use service_professionals::Entity as ServiceProfessionals;
pub use service_requests::Entity as ServiceRequests;
pub use services::Entity as Services;
pub use users::Entity as Users;
