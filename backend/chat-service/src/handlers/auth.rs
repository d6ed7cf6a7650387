use crate::error::AppError;
use crate::middleware::{AuthenticatedUser, SkipPresence};
use crate::models::UserRead;
use crate::state::AppState;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(
        length(min = 3, max = 50, message = "Username must be 3-50 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// `username` holds the email address or the username
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Letters, digits, `_`, `-` and `.`
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_charset");
        err.message = Some("Username may only contain letters, digits, '_', '-' and '.'".into());
        Err(err)
    }
}

/// POST /auth/register
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;

    let user = state
        .users
        .register(req.email.trim(), req.username.trim(), &req.password)
        .await?;

    Ok(HttpResponse::Created().json(UserRead::from(user)))
}

/// POST /auth/jwt/login
///
/// Accepts an OAuth2-style form or a JSON body. The token is returned in the
/// body and set as an HTTP-only cookie.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Either<web::Json<LoginRequest>, web::Form<LoginRequest>>,
) -> Result<HttpResponse, AppError> {
    let req = match body {
        web::Either::Left(json) => json.into_inner(),
        web::Either::Right(form) => form.into_inner(),
    };
    req.validate()?;

    let user = state.users.authenticate(&req.username, &req.password).await?;
    let token = state.jwt.issue(user.id)?;

    let cookie = Cookie::build(state.config.cookie.name.clone(), token.clone())
        .path("/")
        .http_only(true)
        .secure(state.config.cookie.secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(state.jwt.ttl_secs()))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(TokenResponse {
        access_token: token,
        token_type: "bearer",
    }))
}

/// POST /auth/jwt/logout
pub async fn logout(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.presence.mark_offline(user.id()).await?;

    let mut cookie = Cookie::build(state.config.cookie.name.clone(), "")
        .path("/")
        .http_only(true)
        .secure(state.config.cookie.secure)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();

    let mut response = HttpResponse::NoContent().cookie(cookie).finish();
    response.extensions_mut().insert(SkipPresence);

    tracing::info!(user_id = %user.id(), "User logged out");
    Ok(response)
}
