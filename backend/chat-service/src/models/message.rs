use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Row in the `messages` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub conversation_id: Uuid,
    pub created_by_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Message joined with its author's username
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageWithAuthor {
    pub id: Uuid,
    pub content: String,
    pub conversation_id: Uuid,
    pub created_by_user_id: Uuid,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageRead {
    pub id: Uuid,
    pub content: String,
    pub conversation_id: Uuid,
    pub created_by_user_id: Uuid,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
}

impl MessageRead {
    pub fn from_message(message: Message, author_username: impl Into<String>) -> Self {
        Self {
            id: message.id,
            content: message.content,
            conversation_id: message.conversation_id,
            created_by_user_id: message.created_by_user_id,
            author_username: author_username.into(),
            created_at: message.created_at,
        }
    }
}

impl From<MessageWithAuthor> for MessageRead {
    fn from(m: MessageWithAuthor) -> Self {
        Self {
            id: m.id,
            content: m.content,
            conversation_id: m.conversation_id,
            created_by_user_id: m.created_by_user_id,
            author_username: m.author_username,
            created_at: m.created_at,
        }
    }
}
