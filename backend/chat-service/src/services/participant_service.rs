use crate::db::participant_repo::NewParticipant;
use crate::db::{self, conversation_repo, participant_repo, user_repo};
use crate::models::{Conversation, InvitationRead, ParticipantRead, ParticipantStatus};
use crate::services::{ServiceError, ServiceResult};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Invitations and membership of conversations
#[derive(Clone)]
pub struct ParticipantService {
    pool: SqlitePool,
}

impl ParticipantService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Invite another user into a conversation the inviter has joined
    pub async fn invite(
        &self,
        slug: &str,
        inviter: Uuid,
        invitee_user_id: Uuid,
    ) -> ServiceResult<ParticipantRead> {
        let conversation = self.find_conversation(slug).await?;

        let inviter_status = participant_repo::find_by_user_and_conversation(
            &self.pool,
            inviter,
            conversation.id,
        )
        .await?
        .map(|p| p.status);
        if inviter_status != Some(ParticipantStatus::Joined) {
            return Err(ServiceError::not_authorized(
                "Only joined participants can invite others",
            ));
        }

        user_repo::find_by_id(&self.pool, invitee_user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        if participant_repo::find_by_user_and_conversation(
            &self.pool,
            invitee_user_id,
            conversation.id,
        )
        .await?
        .is_some()
        {
            return Err(ServiceError::conflict(
                "User is already a participant of this conversation",
            ));
        }

        let participant = participant_repo::create_participant(
            &self.pool,
            &NewParticipant {
                user_id: invitee_user_id,
                conversation_id: conversation.id,
                status: ParticipantStatus::Invited,
                invited_by_user_id: Some(inviter),
                initial_message_id: None,
                joined_at: None,
            },
            Utc::now(),
        )
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                ServiceError::conflict("User is already a participant of this conversation")
            } else {
                ServiceError::Database(e)
            }
        })?;

        info!(
            conversation_id = %conversation.id,
            participant_id = %participant.id,
            inviter = %inviter,
            invitee = %invitee_user_id,
            "User invited"
        );
        self.read(participant.id).await
    }

    pub async fn list_participants(
        &self,
        slug: &str,
        requesting_user: Uuid,
    ) -> ServiceResult<Vec<ParticipantRead>> {
        let conversation = self.find_conversation(slug).await?;

        let can_view = participant_repo::find_by_user_and_conversation(
            &self.pool,
            requesting_user,
            conversation.id,
        )
        .await?
        .map(|p| p.status.can_view())
        .unwrap_or(false);
        if !can_view {
            return Err(ServiceError::not_authorized(
                "You are not a participant of this conversation",
            ));
        }

        let participants =
            participant_repo::list_for_conversation(&self.pool, conversation.id).await?;
        Ok(participants.into_iter().map(ParticipantRead::from).collect())
    }

    /// Answer an invitation.
    ///
    /// Only the invited user may answer, only with `joined` or `rejected`,
    /// and only while the invitation is still pending. Accepting stamps
    /// `joined_at` and bumps the conversation's activity in the same
    /// transaction.
    pub async fn update_invitation_status(
        &self,
        participant_id: Uuid,
        requesting_user: Uuid,
        new_status: ParticipantStatus,
    ) -> ServiceResult<ParticipantRead> {
        let participant = participant_repo::find_by_id(&self.pool, participant_id)
            .await?
            .ok_or(ServiceError::ParticipantNotFound)?;

        if participant.user_id != requesting_user {
            return Err(ServiceError::not_authorized(
                "Only the invited user can answer this invitation",
            ));
        }
        if !matches!(
            new_status,
            ParticipantStatus::Joined | ParticipantStatus::Rejected
        ) {
            return Err(ServiceError::business_rule(format!(
                "Invitation can only be answered with joined or rejected, not {}",
                new_status
            )));
        }
        if !participant.status.can_transition_to(new_status) {
            return Err(ServiceError::business_rule(format!(
                "Invitation is no longer pending (status: {})",
                participant.status
            )));
        }

        let now = Utc::now();
        let joined_at = (new_status == ParticipantStatus::Joined).then_some(now);

        let mut tx = self.pool.begin().await?;
        let updated = participant_repo::update_status(
            &mut *tx,
            participant.id,
            participant.status,
            new_status,
            joined_at,
            now,
        )
        .await?
        .ok_or_else(|| ServiceError::business_rule("Invitation was already answered"))?;

        if new_status == ParticipantStatus::Joined {
            conversation_repo::touch_activity(&mut *tx, updated.conversation_id, now).await?;
        }
        tx.commit().await?;

        info!(
            participant_id = %updated.id,
            conversation_id = %updated.conversation_id,
            status = %updated.status,
            "Invitation answered"
        );
        self.read(updated.id).await
    }

    pub async fn list_user_invitations(&self, user_id: Uuid) -> ServiceResult<Vec<InvitationRead>> {
        Ok(participant_repo::list_invitations_for_user(&self.pool, user_id).await?)
    }

    async fn find_conversation(&self, slug: &str) -> ServiceResult<Conversation> {
        conversation_repo::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ServiceError::ConversationNotFound)
    }

    async fn read(&self, participant_id: Uuid) -> ServiceResult<ParticipantRead> {
        participant_repo::find_detail_by_id(&self.pool, participant_id)
            .await?
            .map(ParticipantRead::from)
            .ok_or(ServiceError::ParticipantNotFound)
    }
}
