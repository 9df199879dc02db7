use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::{
    dto::professional::ProfessionalDashboard,
    entity::service_professionals::{
        Column as ProfessionalCol, Entity as ServiceProfessionals, Model as ProfessionalModel,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_role},
    models::{ServiceProfessional, UserRole},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProfessionalDashboard>> {
    ensure_role(user, UserRole::Professional)?;
    let user_id = user.id()?;

    let profile = ServiceProfessionals::find()
        .filter(ProfessionalCol::UserId.eq(user_id))
        .one(&state.orm)
        .await?;

    let message = if profile.is_some() {
        "Professional dashboard"
    } else {
        "No professional profile on file."
    };

    let data = ProfessionalDashboard {
        profile: profile.map(professional_from_entity),
    };

    Ok(ApiResponse::success(message, data, Some(Meta::empty())))
}

fn professional_from_entity(model: ProfessionalModel) -> ServiceProfessional {
    ServiceProfessional {
        id: model.id,
        user_id: model.user_id,
        service_type: model.service_type,
        experience: model.experience,
        is_approved: model.is_approved,
        resume_path: model.resume_path,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
