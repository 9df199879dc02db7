use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::customer::{CustomerDashboard, RequestServicePayload},
    entity::{
        service_professionals::{Column as ProfessionalCol, Entity as ServiceProfessionals},
        service_requests::{
            self, Column as RequestCol, Entity as ServiceRequests, Model as RequestModel,
        },
        services::{Entity as Services, Model as ServiceModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{RequestStatus, Service, ServiceRequest, UserRole},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// The catalogue plus the caller's own requests. The catalogue is gated on
/// the existence of at least one approved professional: if there is one,
/// every service is listed, approved or not; if there is none, the list is
/// empty.
pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CustomerDashboard>> {
    ensure_role(user, UserRole::Customer)?;
    let customer_id = user.id()?;

    let approved_professionals = ServiceProfessionals::find()
        .filter(ProfessionalCol::IsApproved.eq(true))
        .count(&state.orm)
        .await?;

    let services = if approved_professionals > 0 {
        Services::find().all(&state.orm).await?
    } else {
        Vec::new()
    };

    let requests = ServiceRequests::find()
        .filter(RequestCol::CustomerId.eq(customer_id))
        .all(&state.orm)
        .await?;

    let total = services.len() as i64;
    let data = CustomerDashboard {
        services: services.into_iter().map(service_from_entity).collect(),
        requests: requests.into_iter().map(request_from_entity).collect(),
    };

    Ok(ApiResponse::success(
        "Customer dashboard",
        data,
        Some(Meta::total(total)),
    ))
}

/// File a request with a professional. At most one `Requested` row per
/// (customer, professional) pair is allowed; the check and the insert are
/// separate statements.
pub async fn request_service(
    state: &AppState,
    user: &AuthUser,
    payload: RequestServicePayload,
) -> AppResult<ApiResponse<ServiceRequest>> {
    ensure_role(user, UserRole::Customer)?;
    let customer_id = user.id()?;

    let professional = ServiceProfessionals::find_by_id(payload.professional_id)
        .one(&state.orm)
        .await?;
    let professional = match professional {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let existing = ServiceRequests::find()
        .filter(RequestCol::CustomerId.eq(customer_id))
        .filter(RequestCol::ProfessionalId.eq(professional.id))
        .filter(RequestCol::ServiceStatus.eq(RequestStatus::Requested))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "You already have a pending service request with this professional.".to_string(),
        ));
    }

    let request = service_requests::ActiveModel {
        id: Set(Uuid::new_v4()),
        professional_id: Set(professional.id),
        service_id: NotSet,
        customer_id: Set(customer_id),
        service_status: Set(RequestStatus::Requested),
        status: NotSet,
        date_of_request: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(customer_id),
        "service_request_create",
        Some("service_requests"),
        Some(serde_json::json!({
            "request_id": request.id,
            "professional_id": professional.id,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Service requested successfully!",
        request_from_entity(request),
        Some(Meta::empty()),
    ))
}

/// Delete one of the caller's own requests. Requests belonging to someone
/// else are reported as missing, not as forbidden.
pub async fn cancel_request(
    state: &AppState,
    user: &AuthUser,
    request_id: Uuid,
) -> AppResult<ApiResponse<ServiceRequest>> {
    ensure_role(user, UserRole::Customer)?;
    let customer_id = user.id()?;

    let request = ServiceRequests::find_by_id(request_id)
        .one(&state.orm)
        .await?;
    let request = match request {
        Some(r) if r.customer_id == customer_id => r,
        _ => return Err(AppError::NotFound),
    };

    ServiceRequests::delete_by_id(request.id)
        .exec(&state.orm)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(customer_id),
        "service_request_cancel",
        Some("service_requests"),
        Some(serde_json::json!({ "request_id": request.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Your service request has been canceled.",
        request_from_entity(request),
        Some(Meta::empty()),
    ))
}

fn service_from_entity(model: ServiceModel) -> Service {
    Service {
        id: model.id,
        name: model.name,
        base_price: model.base_price,
        time_required: model.time_required,
        description: model.description,
        is_approved: model.is_approved,
        admin_service_id: model.admin_service_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn request_from_entity(model: RequestModel) -> ServiceRequest {
    ServiceRequest {
        id: model.id,
        professional_id: model.professional_id,
        service_id: model.service_id,
        customer_id: model.customer_id,
        service_status: model.service_status,
        status: model.status,
        date_of_request: model.date_of_request.with_timezone(&Utc),
    }
}
