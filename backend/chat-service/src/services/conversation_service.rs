use crate::db::participant_repo::NewParticipant;
use crate::db::{self, conversation_repo, message_repo, participant_repo, user_repo};
use crate::models::{
    generate_slug, Conversation, ConversationDetail, MessageRead, Participant, ParticipantRead,
    ParticipantStatus, User,
};
use crate::services::{ServiceError, ServiceResult};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Conversations and the messages posted in them
#[derive(Clone)]
pub struct ConversationService {
    pool: SqlitePool,
}

impl ConversationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a conversation with one invitee.
    ///
    /// The conversation, its first message, the creator (joined) and the
    /// invitee (invited, pointing at that message) are written in a single
    /// transaction.
    pub async fn create_conversation(
        &self,
        creator: Uuid,
        invitee_user_id: Uuid,
        initial_message: &str,
        name: Option<&str>,
    ) -> ServiceResult<ConversationDetail> {
        let content = initial_message.trim();
        if content.is_empty() {
            return Err(ServiceError::business_rule(
                "Initial message must not be empty",
            ));
        }
        if creator == invitee_user_id {
            return Err(ServiceError::business_rule(
                "Cannot start a conversation with yourself",
            ));
        }
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        user_repo::find_by_id(&mut *tx, invitee_user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        let conversation = conversation_repo::create_conversation(
            &mut *tx,
            name,
            &generate_slug(name),
            creator,
            now,
        )
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                ServiceError::conflict("Conversation slug already taken, please retry")
            } else {
                ServiceError::Database(e)
            }
        })?;

        let message =
            message_repo::create_message(&mut *tx, conversation.id, creator, content, now).await?;

        participant_repo::create_participant(
            &mut *tx,
            &NewParticipant {
                user_id: creator,
                conversation_id: conversation.id,
                status: ParticipantStatus::Joined,
                invited_by_user_id: None,
                initial_message_id: None,
                joined_at: Some(now),
            },
            now,
        )
        .await?;

        participant_repo::create_participant(
            &mut *tx,
            &NewParticipant {
                user_id: invitee_user_id,
                conversation_id: conversation.id,
                status: ParticipantStatus::Invited,
                invited_by_user_id: Some(creator),
                initial_message_id: Some(message.id),
                joined_at: None,
            },
            now,
        )
        .await?;

        tx.commit().await?;

        info!(
            conversation_id = %conversation.id,
            slug = %conversation.slug,
            creator = %creator,
            invitee = %invitee_user_id,
            "Conversation created"
        );

        self.load_detail(conversation, ParticipantStatus::Joined, None)
            .await
    }

    /// Full view of a conversation for a participant.
    ///
    /// Joined users see every message; invited users only see the message
    /// they were invited with.
    pub async fn get_conversation(
        &self,
        slug: &str,
        requesting_user: Uuid,
    ) -> ServiceResult<ConversationDetail> {
        let conversation = self.find_by_slug(slug).await?;
        let participant = self
            .viewer(&conversation, requesting_user)
            .await?
            .filter(|p| p.status.can_view())
            .ok_or_else(|| {
                ServiceError::not_authorized("You are not a participant of this conversation")
            })?;

        self.load_detail(
            conversation,
            participant.status,
            participant.initial_message_id,
        )
        .await
    }

    /// Conversations the user has joined, most recently active first
    pub async fn list_user_conversations(&self, user_id: Uuid) -> ServiceResult<Vec<Conversation>> {
        Ok(conversation_repo::list_for_user(&self.pool, user_id, ParticipantStatus::Joined).await?)
    }

    /// Every conversation. Superusers only.
    pub async fn list_conversations(
        &self,
        requester: &User,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Conversation>> {
        if !requester.is_superuser {
            return Err(ServiceError::not_authorized(
                "Only superusers can list all conversations",
            ));
        }
        Ok(conversation_repo::list_all(&self.pool, limit, offset).await?)
    }

    pub async fn create_message(
        &self,
        slug: &str,
        author: Uuid,
        content: &str,
    ) -> ServiceResult<MessageRead> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ServiceError::business_rule("Message must not be empty"));
        }

        let conversation = self.find_by_slug(slug).await?;
        self.require_joined(&conversation, author).await?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let message =
            message_repo::create_message(&mut *tx, conversation.id, author, content, now).await?;
        conversation_repo::touch_activity(&mut *tx, conversation.id, now).await?;
        let author_username = user_repo::find_by_id(&mut *tx, author)
            .await?
            .map(|u| u.username)
            .ok_or(ServiceError::UserNotFound)?;
        tx.commit().await?;

        info!(
            conversation_id = %conversation.id,
            message_id = %message.id,
            author = %author,
            "Message posted"
        );
        Ok(MessageRead::from_message(message, author_username))
    }

    pub async fn list_messages(
        &self,
        slug: &str,
        requesting_user: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<MessageRead>> {
        let conversation = self.find_by_slug(slug).await?;
        self.require_joined(&conversation, requesting_user).await?;

        let messages =
            message_repo::list_for_conversation(&self.pool, conversation.id, limit, offset)
                .await?;
        Ok(messages.into_iter().map(MessageRead::from).collect())
    }

    pub(crate) async fn find_by_slug(&self, slug: &str) -> ServiceResult<Conversation> {
        conversation_repo::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ServiceError::ConversationNotFound)
    }

    async fn viewer(
        &self,
        conversation: &Conversation,
        user_id: Uuid,
    ) -> ServiceResult<Option<Participant>> {
        Ok(
            participant_repo::find_by_user_and_conversation(&self.pool, user_id, conversation.id)
                .await?,
        )
    }

    async fn require_joined(&self, conversation: &Conversation, user_id: Uuid) -> ServiceResult<()> {
        match self.viewer(conversation, user_id).await? {
            Some(p) if p.status == ParticipantStatus::Joined => Ok(()),
            _ => Err(ServiceError::not_authorized(
                "You must join the conversation first",
            )),
        }
    }

    async fn load_detail(
        &self,
        conversation: Conversation,
        viewer_status: ParticipantStatus,
        initial_message_id: Option<Uuid>,
    ) -> ServiceResult<ConversationDetail> {
        let participants =
            participant_repo::list_for_conversation(&self.pool, conversation.id).await?;

        let messages = if viewer_status == ParticipantStatus::Joined {
            message_repo::list_for_conversation(
                &self.pool,
                conversation.id,
                message_repo::ALL_ROWS,
                0,
            )
            .await?
        } else {
            match initial_message_id {
                Some(id) => message_repo::find_by_id(&self.pool, id)
                    .await?
                    .into_iter()
                    .collect(),
                None => Vec::new(),
            }
        };

        Ok(ConversationDetail {
            conversation: conversation.into(),
            participants: participants.into_iter().map(ParticipantRead::from).collect(),
            messages: messages.into_iter().map(MessageRead::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{insert_user, test_pool};

    async fn setup() -> (SqlitePool, ConversationService, User, User) {
        let pool = test_pool().await;
        let service = ConversationService::new(pool.clone());
        let alice = insert_user(&pool, "alice").await;
        let bob = insert_user(&pool, "bob").await;
        (pool, service, alice, bob)
    }

    #[tokio::test]
    async fn test_create_conversation_writes_everything() {
        let (_pool, service, alice, bob) = setup().await;

        let detail = service
            .create_conversation(alice.id, bob.id, "hello bob", Some("Weekend Plans"))
            .await
            .unwrap();

        assert!(detail.conversation.slug.starts_with("weekend-plans-"));
        assert_eq!(detail.conversation.created_by_user_id, alice.id);
        assert_eq!(detail.messages.len(), 1);
        assert_eq!(detail.messages[0].author_username, "alice");
        assert_eq!(detail.participants.len(), 2);

        let creator = &detail.participants[0];
        assert_eq!(creator.user_id, alice.id);
        assert_eq!(creator.status, ParticipantStatus::Joined);
        assert!(creator.joined_at.is_some());

        let invitee = &detail.participants[1];
        assert_eq!(invitee.user_id, bob.id);
        assert_eq!(invitee.status, ParticipantStatus::Invited);
        assert_eq!(invitee.invited_by_user_id, Some(alice.id));
        assert_eq!(invitee.initial_message_id, Some(detail.messages[0].id));
    }

    #[tokio::test]
    async fn test_create_conversation_rules() {
        let (pool, service, alice, bob) = setup().await;

        assert!(matches!(
            service.create_conversation(alice.id, alice.id, "hi", None).await,
            Err(ServiceError::BusinessRule(_))
        ));
        assert!(matches!(
            service.create_conversation(alice.id, bob.id, "   ", None).await,
            Err(ServiceError::BusinessRule(_))
        ));
        assert!(matches!(
            service
                .create_conversation(alice.id, Uuid::new_v4(), "hi", None)
                .await,
            Err(ServiceError::UserNotFound)
        ));

        // nothing half-written by the failed attempts
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_invited_user_sees_only_initial_message() {
        let (pool, service, alice, bob) = setup().await;
        let detail = service
            .create_conversation(alice.id, bob.id, "first", None)
            .await
            .unwrap();
        let slug = detail.conversation.slug.clone();
        assert!(slug.starts_with("conversation-"));

        // a second message added directly, bob has not joined yet
        message_repo::create_message(&pool, detail.conversation.id, alice.id, "second", Utc::now())
            .await
            .unwrap();

        let as_alice = service.get_conversation(&slug, alice.id).await.unwrap();
        assert_eq!(as_alice.messages.len(), 2);

        let as_bob = service.get_conversation(&slug, bob.id).await.unwrap();
        assert_eq!(as_bob.messages.len(), 1);
        assert_eq!(as_bob.messages[0].content, "first");
    }

    #[tokio::test]
    async fn test_deleted_user_disappears_from_detail() {
        let (pool, service, alice, bob) = setup().await;
        let detail = service
            .create_conversation(alice.id, bob.id, "first", None)
            .await
            .unwrap();
        let slug = detail.conversation.slug.clone();
        let now = Utc::now();
        participant_repo::update_status(
            &pool,
            detail.participants[1].id,
            ParticipantStatus::Invited,
            ParticipantStatus::Joined,
            Some(now),
            now,
        )
        .await
        .unwrap();
        service.create_message(&slug, bob.id, "bye").await.unwrap();

        user_repo::soft_delete(&pool, bob.id, Utc::now()).await.unwrap();

        let as_alice = service.get_conversation(&slug, alice.id).await.unwrap();
        assert_eq!(as_alice.participants.len(), 1);
        assert_eq!(as_alice.participants[0].user_id, alice.id);
        assert_eq!(as_alice.messages.len(), 1);
        assert_eq!(as_alice.messages[0].author_username, "alice");

        let messages = service.list_messages(&slug, alice.id, 50, 0).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn test_outsider_cannot_view() {
        let (pool, service, alice, bob) = setup().await;
        let carol = insert_user(&pool, "carol").await;
        let detail = service
            .create_conversation(alice.id, bob.id, "hi", None)
            .await
            .unwrap();

        assert!(matches!(
            service
                .get_conversation(&detail.conversation.slug, carol.id)
                .await,
            Err(ServiceError::NotAuthorized(_))
        ));
        assert!(matches!(
            service.get_conversation("missing-slug", alice.id).await,
            Err(ServiceError::ConversationNotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_message_requires_joined() {
        let (_pool, service, alice, bob) = setup().await;
        let detail = service
            .create_conversation(alice.id, bob.id, "hi", None)
            .await
            .unwrap();
        let slug = detail.conversation.slug.clone();

        assert!(matches!(
            service.create_message(&slug, bob.id, "let me in").await,
            Err(ServiceError::NotAuthorized(_))
        ));
        assert!(matches!(
            service.create_message(&slug, alice.id, "").await,
            Err(ServiceError::BusinessRule(_))
        ));

        let message = service
            .create_message(&slug, alice.id, "  again  ")
            .await
            .unwrap();
        assert_eq!(message.content, "again");
        assert_eq!(message.author_username, "alice");

        let refreshed = service.find_by_slug(&slug).await.unwrap();
        assert!(refreshed.last_activity_at >= message.created_at);

        let messages = service.list_messages(&slug, alice.id, 50, 0).await.unwrap();
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "again"]);
    }

    #[tokio::test]
    async fn test_list_user_conversations_only_joined() {
        let (_pool, service, alice, bob) = setup().await;
        service
            .create_conversation(alice.id, bob.id, "hi", None)
            .await
            .unwrap();

        assert_eq!(service.list_user_conversations(alice.id).await.unwrap().len(), 1);
        assert!(service.list_user_conversations(bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_conversations_requires_superuser() {
        let (pool, service, alice, bob) = setup().await;
        service
            .create_conversation(alice.id, bob.id, "hi", None)
            .await
            .unwrap();

        assert!(matches!(
            service.list_conversations(&alice, 50, 0).await,
            Err(ServiceError::NotAuthorized(_))
        ));

        user_repo::set_superuser(&pool, alice.id, true, Utc::now())
            .await
            .unwrap();
        let admin = user_repo::find_by_id(&pool, alice.id).await.unwrap().unwrap();
        assert_eq!(service.list_conversations(&admin, 50, 0).await.unwrap().len(), 1);
    }
}
