//! Authorization gate: `protect` resolves the caller, `authorize` checks the role

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use hospital_core::{Role, User};
use uuid::Uuid;

use crate::AppState;
use crate::auth::token_from_headers;
use crate::db::UserRepository;
use crate::error::AppError;

/// The verified caller, attached to the request by [`protect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(not_authorized)
    }
}

/// Roles accepted by an [`authorize`] layer
#[derive(Debug, Clone, Copy)]
pub struct AllowedRoles(pub &'static [Role]);

pub const ADMIN_ONLY: AllowedRoles = AllowedRoles(&[Role::Admin]);

fn not_authorized() -> AppError {
    AppError::Unauthorized("Not authorized to access this route".to_string())
}

/// Require a valid token whose user still exists
pub async fn protect(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_headers(request.headers()).ok_or_else(not_authorized)?;
    let claims = state.tokens.verify(&token)?;

    let user = UserRepository::new(state.pool.clone())
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::debug!(user_id = %claims.sub, "token refers to a deleted user");
            not_authorized()
        })?;

    let caller = CurrentUser::from(user);
    request.extensions_mut().insert(caller.clone());

    let mut response = next.run(request).await;
    // Lets the audit log name the actor
    response.extensions_mut().insert(caller);
    Ok(response)
}

/// Require the caller resolved by [`protect`] to hold one of the allowed roles
pub async fn authorize(
    State(AllowedRoles(roles)): State<AllowedRoles>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let caller = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(not_authorized)?;

    if !roles.contains(&caller.role) {
        return Err(AppError::Forbidden(format!(
            "User role {} is not authorized to access this route",
            caller.role
        )));
    }

    Ok(next.run(request).await)
}
