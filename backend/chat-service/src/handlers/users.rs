use super::PageQuery;
use crate::error::AppError;
use crate::handlers::auth::validate_username;
use crate::middleware::AuthenticatedUser;
use crate::models::{ConversationRead, UserPublic, UserRead};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 3, max = 50, message = "Username must be 3-50 characters"),
        custom(function = "validate_username")
    )]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

/// GET /users
pub async fn list_users(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let users = state
        .users
        .list_users(user.id(), page.limit(), page.offset())
        .await?;

    Ok(HttpResponse::Ok().json(users.into_iter().map(UserPublic::from).collect::<Vec<_>>()))
}

/// GET /users/online
pub async fn list_online_users(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let users = state.users.list_online_users().await?;
    Ok(HttpResponse::Ok().json(users.into_iter().map(UserPublic::from).collect::<Vec<_>>()))
}

/// GET /users/me and GET /users/me/profile
pub async fn get_me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(UserRead::from(user.0))
}

/// PATCH /users/me
pub async fn update_me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;

    let updated = state
        .users
        .update_profile(
            user.id(),
            req.username.as_deref().map(str::trim),
            req.email.as_deref().map(str::trim),
        )
        .await?;

    Ok(HttpResponse::Ok().json(UserRead::from(updated)))
}

/// DELETE /users/me
pub async fn delete_me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.users.deactivate_account(user.id()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /users/me/invitations
pub async fn my_invitations(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let invitations = state.participants.list_user_invitations(user.id()).await?;
    Ok(HttpResponse::Ok().json(invitations))
}

/// GET /users/me/conversations
pub async fn my_conversations(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let conversations = state.conversations.list_user_conversations(user.id()).await?;
    Ok(HttpResponse::Ok().json(
        conversations
            .into_iter()
            .map(ConversationRead::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /users/{username}
pub async fn get_user(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let found = state.users.get_by_username(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserPublic::from(found)))
}
