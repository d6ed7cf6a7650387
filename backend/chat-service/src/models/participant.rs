//! Participant records and the invitation state machine.
//!
//! Status lifecycle: a participant starts `invited` (or `joined` for the
//! creator) and an invitation can be answered exactly once, moving it to
//! `joined` or `rejected`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Invited,
    Joined,
    Rejected,
    Left,
}

impl ParticipantStatus {
    /// Parse status from a request or database string (case-insensitive)
    pub fn from_db(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "invited" => Some(Self::Invited),
            "joined" => Some(Self::Joined),
            "rejected" => Some(Self::Rejected),
            "left" => Some(Self::Left),
            _ => None,
        }
    }

    pub fn to_db(&self) -> &'static str {
        match self {
            Self::Invited => "invited",
            Self::Joined => "joined",
            Self::Rejected => "rejected",
            Self::Left => "left",
        }
    }

    /// Only a pending invitation can change state, and only to an answer.
    pub fn can_transition_to(&self, next: ParticipantStatus) -> bool {
        matches!(
            (self, next),
            (Self::Invited, Self::Joined) | (Self::Invited, Self::Rejected)
        )
    }

    /// Statuses that let a user see a conversation at all
    pub fn can_view(&self) -> bool {
        matches!(self, Self::Invited | Self::Joined)
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db())
    }
}

impl std::str::FromStr for ParticipantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db(s).ok_or_else(|| format!("Invalid participant status: {}", s))
    }
}

/// Row in the `participants` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Participant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub conversation_id: Uuid,
    pub status: ParticipantStatus,
    pub invited_by_user_id: Option<Uuid>,
    pub initial_message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub joined_at: Option<DateTime<Utc>>,
}

/// Participant joined with the user's name and presence
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipantDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub is_online: bool,
    pub conversation_id: Uuid,
    pub status: ParticipantStatus,
    pub invited_by_user_id: Option<Uuid>,
    pub initial_message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub joined_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantRead {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub is_online: bool,
    pub conversation_id: Uuid,
    pub status: ParticipantStatus,
    pub invited_by_user_id: Option<Uuid>,
    pub initial_message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl From<ParticipantDetail> for ParticipantRead {
    fn from(p: ParticipantDetail) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            username: p.username,
            is_online: p.is_online,
            conversation_id: p.conversation_id,
            status: p.status,
            invited_by_user_id: p.invited_by_user_id,
            initial_message_id: p.initial_message_id,
            created_at: p.created_at,
            joined_at: p.joined_at,
        }
    }
}

/// A pending invitation as shown in the invitee's inbox
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InvitationRead {
    pub participant_id: Uuid,
    pub conversation_id: Uuid,
    pub conversation_slug: String,
    pub conversation_name: Option<String>,
    pub invited_by_user_id: Option<Uuid>,
    pub invited_by_username: Option<String>,
    pub initial_message: Option<String>,
    pub created_at: DateTime<Utc>,
}
