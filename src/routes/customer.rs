use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::customer::{CustomerDashboard, RequestServicePayload},
    error::AppResult,
    middleware::auth::AuthUser,
    models::ServiceRequest,
    response::ApiResponse,
    services::customer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/requests", post(request_service))
        .route("/requests/{id}", delete(cancel_request))
}

#[utoipa::path(
    get,
    path = "/api/customer/dashboard",
    responses(
        (status = 200, description = "Service catalogue and own requests", body = ApiResponse<CustomerDashboard>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Customer"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CustomerDashboard>>> {
    let resp = customer_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/customer/requests",
    request_body = RequestServicePayload,
    responses(
        (status = 200, description = "File a service request", body = ApiResponse<ServiceRequest>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Professional not found"),
        (status = 409, description = "Pending request with this professional already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Customer"
)]
pub async fn request_service(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RequestServicePayload>,
) -> AppResult<Json<ApiResponse<ServiceRequest>>> {
    let resp = customer_service::request_service(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/customer/requests/{id}",
    params(
        ("id" = Uuid, Path, description = "Service request ID")
    ),
    responses(
        (status = 200, description = "Cancel own request", body = ApiResponse<ServiceRequest>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Customer"
)]
pub async fn cancel_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ServiceRequest>>> {
    let resp = customer_service::cancel_request(&state, &user, id).await?;
    Ok(Json(resp))
}
