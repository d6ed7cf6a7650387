//! Business rules. Services own a pool handle, run multi-step mutations in
//! a single transaction and report failures as `ServiceError`.

pub mod conversation_service;
pub mod error;
pub mod participant_service;
pub mod presence_service;
pub mod user_service;

pub use conversation_service::ConversationService;
pub use error::{ServiceError, ServiceResult};
pub use participant_service::ParticipantService;
pub use presence_service::{PresenceService, PresenceSweep};
pub use user_service::UserService;
