//! Account handlers: register, login, me and logout

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use deadpool_postgres::Pool;
use hospital_core::{
    ApiResponse, Empty, ErrorBody, LoginPayload, RegisterPayload, TokenResponse, User,
};

use crate::auth::{TokenKeys, expired_cookie, session_cookie, verify_password};
use crate::db::UserRepository;
use crate::error::{AppError, json_body};
use crate::middleware::CurrentUser;

/// How the session cookie is written
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub days: u32,
    pub secure: bool,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

/// Sign a token for `user` and return it both in the body and as a cookie
fn token_response(
    user: &User,
    tokens: &TokenKeys,
    cookies: CookieSettings,
    status: StatusCode,
) -> Result<Response, AppError> {
    let token = tokens.issue(user)?;
    let cookie = session_cookie(&token, cookies.days, cookies.secure);
    Ok((
        status,
        [(header::SET_COOKIE, cookie)],
        Json(TokenResponse::new(token)),
    )
        .into_response())
}

/// POST /api/v1/auth/register - Create an account and sign in
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 200, description = "Account created, token issued", body = TokenResponse),
        (status = 400, description = "Validation failed or email already registered", body = ErrorBody),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(pool): State<Pool>,
    State(tokens): State<TokenKeys>,
    State(cookies): State<CookieSettings>,
    body: Result<Json<RegisterPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let payload = json_body(body)?;
    let user = UserRepository::new(pool).create(payload).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");
    token_response(&user, &tokens, cookies, StatusCode::OK)
}

/// POST /api/v1/auth/login - Exchange credentials for a token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 400, description = "Email or password missing", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(pool): State<Pool>,
    State(tokens): State<TokenKeys>,
    State(cookies): State<CookieSettings>,
    body: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let LoginPayload { email, password } = json_body(body)?;
    let (Some(email), Some(password)) = (
        email.filter(|e| !e.trim().is_empty()),
        password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "Please provide an email and password".to_string(),
        ));
    };

    let user = UserRepository::new(pool)
        .find_by_email(email.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(invalid_credentials());
    }

    token_response(&user, &tokens, cookies, StatusCode::OK)
}

/// GET /api/v1/auth/me - The signed-in user's profile
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "The caller", body = User),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(pool): State<Pool>,
    caller: CurrentUser,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = UserRepository::new(pool)
        .find_by_id(caller.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not authorized to access this route".to_string()))?;
    Ok(Json(ApiResponse::data(user)))
}

/// GET /api/v1/auth/logout - Clear the session cookie
#[utoipa::path(
    get,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Cookie cleared", body = Empty),
    ),
    tag = "Auth"
)]
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, expired_cookie())],
        Json(ApiResponse::data(Empty {})),
    )
}
