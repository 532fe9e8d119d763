use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::entity::role;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// The account behind a `Bearer` token.
///
/// Handlers take this as a parameter to require a login, then call
/// [`AuthUser::require_permission`] for the capability they need. Students and
/// administrators are told apart only through the permissions their role grants.
#[derive(Debug)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn require_permission(&self, permission: &str) -> Result<(), AppError> {
        if self.permissions.iter().any(|p| p == permission) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == role::ADMIN
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AppError::TokenMissing)?
        .to_str()
        .map_err(|_| AppError::TokenInvalid)?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::TokenInvalid)
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let state = AppState::from_ref(state);
        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(Self {
            user_id: claims.uid,
            email: claims.sub,
            role: claims.role,
            permissions: claims.permissions,
        })
    }
}
