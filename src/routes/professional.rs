use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::professional::ProfessionalDashboard,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::professional_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/professional/dashboard",
    responses(
        (status = 200, description = "Own professional profile, if any", body = ApiResponse<ProfessionalDashboard>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Professional"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfessionalDashboard>>> {
    let resp = professional_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}
