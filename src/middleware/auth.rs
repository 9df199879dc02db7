use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, entity::users::UserRole, error::AppError};

/// Identity extracted from the Bearer token.
///
/// The admin identity is configured through the environment and has no row in
/// `users`; its tokens carry `sub = "admin"` and decode to `user_id: None`.
/// Every registered account decodes to `Some(id)`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Option<Uuid>,
    pub role: UserRole,
}

impl AuthUser {
    pub fn id(&self) -> Result<Uuid, AppError> {
        self.user_id.ok_or(AppError::Forbidden)
    }
}

pub fn ensure_role(user: &AuthUser, role: UserRole) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, UserRole::Admin)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::BadRequest("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::BadRequest("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::BadRequest("Invalid or expired token".into()))?;

        let user_id = if decoded.claims.sub == "admin" {
            None
        } else {
            let id = Uuid::parse_str(&decoded.claims.sub)
                .map_err(|_| AppError::BadRequest("Invalid user id in token".into()))?;
            Some(id)
        };

        Ok(AuthUser {
            user_id,
            role: decoded.claims.role,
        })
    }
}
