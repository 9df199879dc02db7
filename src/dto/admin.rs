use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Service, ServiceProfessional, User};

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub users: Vec<User>,
    pub professionals: Vec<ServiceProfessional>,
    pub services: Vec<Service>,
}
