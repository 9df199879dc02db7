use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::admin::AdminDashboard,
    entity::{
        customers::{Column as CustomerCol, Entity as Customers},
        service_professionals::{
            ActiveModel as ProfessionalActive, Column as ProfessionalCol,
            Entity as ServiceProfessionals, Model as ProfessionalModel,
        },
        service_requests::{Column as RequestCol, Entity as ServiceRequests},
        services::{self, Entity as Services, Model as ServiceModel},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Service, ServiceProfessional, User, UserRole},
    response::{ApiResponse, Meta},
    routes::admin::{CreateServiceRequest, DashboardQuery},
    state::AppState,
};

/// Full marketplace overview. Without a role filter the user list leaves out
/// admin-role rows; with one, it is exactly the rows of that role.
pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
    query: DashboardQuery,
) -> AppResult<ApiResponse<AdminDashboard>> {
    ensure_admin(user)?;

    let users = match query.role {
        Some(role) => {
            Users::find()
                .filter(UserCol::Role.eq(role))
                .all(&state.orm)
                .await?
        }
        None => {
            Users::find()
                .filter(UserCol::Role.ne(UserRole::Admin))
                .all(&state.orm)
                .await?
        }
    };
    let professionals = ServiceProfessionals::find().all(&state.orm).await?;
    let services = Services::find().all(&state.orm).await?;

    let total = users.len() as i64;
    let data = AdminDashboard {
        users: users.into_iter().map(user_from_entity).collect(),
        professionals: professionals
            .into_iter()
            .map(professional_from_entity)
            .collect(),
        services: services.into_iter().map(service_from_entity).collect(),
    };

    Ok(ApiResponse::success(
        "Admin dashboard",
        data,
        Some(Meta::total(total)),
    ))
}

pub async fn approve_professional(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ServiceProfessional>> {
    ensure_admin(user)?;

    let professional = ServiceProfessionals::find_by_id(id).one(&state.orm).await?;
    let professional = match professional {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ProfessionalActive = professional.into();
    active.is_approved = Set(true);
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "professional_approve",
        Some("service_professionals"),
        Some(serde_json::json!({ "professional_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Service Professional approved successfully!",
        professional_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn create_service(
    state: &AppState,
    user: &AuthUser,
    payload: CreateServiceRequest,
) -> AppResult<ApiResponse<Service>> {
    ensure_admin(user)?;

    let service = services::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        base_price: Set(payload.base_price),
        time_required: Set(payload.time_required),
        description: Set(payload.description),
        is_approved: NotSet,
        admin_service_id: NotSet,
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "service_create",
        Some("services"),
        Some(serde_json::json!({ "service_id": service.id, "name": service.name.clone() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Service added successfully",
        service_from_entity(service),
        Some(Meta::empty()),
    ))
}

pub async fn delete_service(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Service>> {
    ensure_admin(user)?;

    let service = match Services::find_by_id(id).one(&state.orm).await? {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    Services::delete_by_id(service.id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "service_delete",
        Some("services"),
        Some(serde_json::json!({ "service_id": service.id, "name": service.name.clone() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let message = format!("Service \"{}\" deleted successfully!", service.name);
    Ok(ApiResponse::success(
        message,
        service_from_entity(service),
        Some(Meta::empty()),
    ))
}

/// Mark a service as approved. Approval currently has no effect on what
/// customers see; their dashboard filters on approved professionals only.
pub async fn approve_service(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Service>> {
    ensure_admin(user)?;

    let service = match Services::find_by_id(id).one(&state.orm).await? {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    let mut active: services::ActiveModel = service.into();
    active.is_approved = Set(true);
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "service_approve",
        Some("services"),
        Some(serde_json::json!({ "service_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Service approved successfully!",
        service_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Set the blocked flag on any account, whatever its role. Blocking does not
/// end sessions or stop logins; the flag only shows up in the admin lists.
pub async fn block_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    let target = match Users::find_by_id(id).one(&state.orm).await? {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let username = target.username.clone();
    let mut active: UserActive = target.into();
    active.is_blocked = Set(true);
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "user_block",
        Some("users"),
        Some(serde_json::json!({ "user_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        format!("User {username} blocked successfully!"),
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn unblock_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    let target = match Users::find_by_id(id).one(&state.orm).await? {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let username = target.username.clone();
    let mut active: UserActive = target.into();
    active.is_blocked = Set(false);
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "user_unblock",
        Some("users"),
        Some(serde_json::json!({ "user_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        format!("User {username} unblocked successfully!"),
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Remove an account and everything hanging off it in one transaction.
pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    let target = match Users::find_by_id(id).one(&state.orm).await? {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };
    if target.role == UserRole::Admin {
        return Err(AppError::BadRequest("Cannot delete another admin.".into()));
    }

    let txn = state.orm.begin().await?;

    let professional_ids: Vec<Uuid> = ServiceProfessionals::find()
        .filter(ProfessionalCol::UserId.eq(target.id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();
    // An empty IN list matches nothing but still hits the database; skip it.
    if !professional_ids.is_empty() {
        ServiceRequests::delete_many()
            .filter(RequestCol::ProfessionalId.is_in(professional_ids))
            .exec(&txn)
            .await?;
    }

    ServiceRequests::delete_many()
        .filter(RequestCol::CustomerId.eq(target.id))
        .exec(&txn)
        .await?;
    Customers::delete_many()
        .filter(CustomerCol::UserId.eq(target.id))
        .exec(&txn)
        .await?;
    ServiceProfessionals::delete_many()
        .filter(ProfessionalCol::UserId.eq(target.id))
        .exec(&txn)
        .await?;
    Users::delete_by_id(target.id).exec(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "user_delete",
        Some("users"),
        Some(serde_json::json!({ "user_id": target.id, "username": target.username.clone() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let message = format!("User {} deleted successfully!", target.username);
    Ok(ApiResponse::success(
        message,
        user_from_entity(target),
        Some(Meta::empty()),
    ))
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        username: model.username,
        role: model.role,
        is_blocked: model.is_blocked,
        created_at: model.created_at.with_timezone(&Utc),
    }
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
