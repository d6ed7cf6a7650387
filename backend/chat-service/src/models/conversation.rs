use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{MessageRead, ParticipantRead};

/// Row in the `conversations` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub name: Option<String>,
    pub slug: String,
    pub created_by_user_id: Uuid,
    pub last_activity_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationRead {
    pub id: Uuid,
    pub name: Option<String>,
    pub slug: String,
    pub created_by_user_id: Uuid,
    pub last_activity_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationRead {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            created_by_user_id: c.created_by_user_id,
            last_activity_at: c.last_activity_at,
            created_at: c.created_at,
        }
    }
}

/// Conversation together with its participants and visible messages
#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: ConversationRead,
    pub participants: Vec<ParticipantRead>,
    pub messages: Vec<MessageRead>,
}
