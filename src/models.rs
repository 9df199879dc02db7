use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub use crate::entity::service_requests::RequestStatus;
pub use crate::entity::users::UserRole;

/// Account as exposed by the API. The stored password hash never leaves the
/// service layer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceProfessional {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_type: String,
    pub experience: String,
    pub is_approved: bool,
    pub resume_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub base_price: i64,
    pub time_required: String,
    pub description: String,
    pub is_approved: bool,
    pub admin_service_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub service_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub service_status: RequestStatus,
    pub status: RequestStatus,
    pub date_of_request: DateTime<Utc>,
}
