use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    error::AppError,
    models::{Capability, Role},
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

pub fn authorize(user: &AuthUser, capability: Capability) -> Result<(), AppError> {
    if !user.role.allows(capability) {
        return Err(AppError::forbidden(format!(
            "Role: {} is not allowed to access this resource",
            user.role.as_str()
        )));
    }
    Ok(())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::unauthorized("Please login to access this resource"))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::unauthorized("Invalid Authorization header"))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization scheme"))?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::unauthorized("Json Web Token is expired, try again.")
            }
            _ => AppError::unauthorized("Json Web Token is invalid, try again."),
        })?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid user id in token"))?;
        let role = decoded
            .claims
            .role
            .parse::<Role>()
            .map_err(|_| AppError::unauthorized("Invalid role in token"))?;

        Ok(AuthUser { user_id, role })
    }
}
