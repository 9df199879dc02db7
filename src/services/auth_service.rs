use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    entity::{customers, service_professionals, users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{User, UserRole},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const UPLOAD_PREFIX: &str = "uploads";

/// Professionals without a resume get no profile row; a missing profile
/// field is not validated and fails the registration as a database error.
pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    if payload.role == UserRole::Admin {
        return Err(AppError::BadRequest("Cannot register as admin.".into()));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
        .bind(payload.username.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let txn = state.orm.begin().await?;

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(payload.username.clone()),
        password_hash: Set(password_hash),
        role: Set(payload.role),
        is_blocked: NotSet,
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    match payload.role {
        UserRole::Customer => {
            customers::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                address: payload.address.map_or(NotSet, Set),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
        }
        UserRole::Professional => {
            // No resume, no profile row; the account still gets created.
            if let Some(resume) = payload.resume.as_deref().filter(|name| !name.is_empty()) {
                let resume_path = format!("{UPLOAD_PREFIX}/{}", sanitize_filename(resume));
                service_professionals::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user.id),
                    service_type: payload.service_type.map_or(NotSet, Set),
                    experience: payload.experience.map_or(NotSet, Set),
                    is_approved: NotSet,
                    resume_path: Set(Some(resume_path)),
                    created_at: NotSet,
                }
                .insert(&txn)
                .await?;
            }
        }
        // Rejected before the transaction started.
        UserRole::Admin => {}
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id, "role": user.role.as_str() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Registration successful. Please login.",
        user_from_entity(user),
        None,
    ))
}

/// The configured admin pair is checked before the users table; the blocked
/// flag is not consulted.
pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let admin_username = std::env::var("ADMIN_USERNAME").ok();
    let admin_password = std::env::var("ADMIN_PASSWORD").ok();
    if admin_username.as_deref() == Some(payload.username.as_str())
        && admin_password.as_deref() == Some(payload.password.as_str())
    {
        let token = issue_token("admin", UserRole::Admin)?;

        if let Err(err) = log_audit(&state.pool, None, "admin_login", Some("users"), None).await {
            tracing::warn!(error = %err, "audit log failed");
        }

        let resp = LoginResponse {
            token: format!("Bearer {token}"),
            role: UserRole::Admin,
        };
        return Ok(ApiResponse::success(
            "Logged in as admin!",
            resp,
            Some(Meta::empty()),
        ));
    }

    let row: Option<(Uuid, String, String)> =
        sqlx::query_as("SELECT id, password_hash, role FROM users WHERE username = $1")
            .bind(payload.username.as_str())
            .fetch_optional(&state.pool)
            .await?;

    let (user_id, password_hash, role) = match row {
        Some(r) => r,
        None => return Err(AppError::Unauthorized),
    };

    let parsed_hash = PasswordHash::new(&password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized);
    }

    let role: UserRole = role
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))?;

    let token = issue_token(&user_id.to_string(), role)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let resp = LoginResponse {
        token: format!("Bearer {token}"),
        role,
    };
    Ok(ApiResponse::success(
        "Logged in successfully!",
        resp,
        Some(Meta::empty()),
    ))
}

/// Tokens are stateless, so logout only leaves an audit record.
pub async fn logout_user(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let (action, message) = match user.role {
        UserRole::Admin => ("admin_logout", "Admin logged out."),
        _ => ("user_logout", "Logged out."),
    };

    if let Err(err) = log_audit(&state.pool, user.user_id, action, Some("users"), None).await {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        message,
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn issue_token(sub: &str, role: UserRole) -> AppResult<String> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: sub.to_string(),
        role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Reduce a client-supplied filename to a safe relative name: separators
/// become word breaks and anything outside `[A-Za-z0-9_.-]` is dropped.
pub fn sanitize_filename(raw: &str) -> String {
    let spaced = raw.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    filtered.trim_matches(['.', '_']).to_string()
}

fn user_from_entity(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        role: model.role,
        is_blocked: model.is_blocked,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
