use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Service, ServiceRequest};

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerDashboard {
    pub services: Vec<Service>,
    pub requests: Vec<ServiceRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestServicePayload {
    pub professional_id: Uuid,
}
