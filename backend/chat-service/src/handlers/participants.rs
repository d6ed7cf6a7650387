use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::ParticipantStatus;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UpdateParticipantRequest {
    pub status: String,
}

/// PUT /participants/{id}
///
/// Accept (`joined`) or reject (`rejected`) an invitation.
pub async fn update_participant(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateParticipantRequest>,
) -> Result<HttpResponse, AppError> {
    let status = req
        .status
        .parse::<ParticipantStatus>()
        .map_err(AppError::BadRequest)?;

    let participant = state
        .participants
        .update_invitation_status(path.into_inner(), user.id(), status)
        .await?;

    Ok(HttpResponse::Ok().json(participant))
}
