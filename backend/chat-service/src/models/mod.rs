//! Persistent entities and the JSON shapes returned by the API.

pub mod conversation;
pub mod message;
pub mod participant;
pub mod slug;
pub mod user;

pub use conversation::{Conversation, ConversationDetail, ConversationRead};
pub use message::{Message, MessageRead, MessageWithAuthor};
pub use participant::{
    InvitationRead, Participant, ParticipantDetail, ParticipantRead, ParticipantStatus,
};
pub use slug::{generate_slug, slugify};
pub use user::{User, UserPublic, UserRead};
