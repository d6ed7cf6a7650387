use super::PageQuery;
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::ConversationRead;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateConversationRequest {
    pub invitee_user_id: Uuid,

    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub initial_message: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMessageRequest {
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub invitee_user_id: Uuid,
}

/// GET /conversations (superusers)
pub async fn list_conversations(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let conversations = state
        .conversations
        .list_conversations(&user.0, page.limit(), page.offset())
        .await?;

    Ok(HttpResponse::Ok().json(
        conversations
            .into_iter()
            .map(ConversationRead::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /conversations
pub async fn create_conversation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateConversationRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;

    let detail = state
        .conversations
        .create_conversation(
            user.id(),
            req.invitee_user_id,
            &req.initial_message,
            req.name.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Created().json(detail))
}

/// GET /conversations/{slug}
pub async fn get_conversation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    slug: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let detail = state
        .conversations
        .get_conversation(&slug, user.id())
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// GET /conversations/{slug}/messages
pub async fn list_messages(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    slug: web::Path<String>,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let messages = state
        .conversations
        .list_messages(&slug, user.id(), page.limit(), page.offset())
        .await?;
    Ok(HttpResponse::Ok().json(messages))
}

/// POST /conversations/{slug}/messages
pub async fn create_message(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    slug: web::Path<String>,
    req: web::Json<CreateMessageRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;

    let message = state
        .conversations
        .create_message(&slug, user.id(), &req.content)
        .await?;
    Ok(HttpResponse::Created().json(message))
}

/// GET /conversations/{slug}/participants
pub async fn list_participants(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    slug: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let participants = state
        .participants
        .list_participants(&slug, user.id())
        .await?;
    Ok(HttpResponse::Ok().json(participants))
}

/// POST /conversations/{slug}/participants
pub async fn invite_participant(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    slug: web::Path<String>,
    req: web::Json<InviteRequest>,
) -> Result<HttpResponse, AppError> {
    let participant = state
        .participants
        .invite(&slug, user.id(), req.invitee_user_id)
        .await?;
    Ok(HttpResponse::Created().json(participant))
}
