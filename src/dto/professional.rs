use serde::Serialize;
use utoipa::ToSchema;

use crate::models::ServiceProfessional;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfessionalDashboard {
    /// `None` for accounts registered without a resume, which have no
    /// professional profile row.
    pub profile: Option<ServiceProfessional>,
}
