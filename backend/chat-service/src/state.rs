use crate::{
    config::Config,
    security::JwtService,
    services::{ConversationService, ParticipantService, PresenceService, UserService},
};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
    pub jwt: JwtService,
    pub users: UserService,
    pub conversations: ConversationService,
    pub participants: ParticipantService,
    pub presence: PresenceService,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let jwt = JwtService::new(&config.jwt.secret, config.jwt.access_token_ttl);

        Self {
            users: UserService::new(db.clone()),
            conversations: ConversationService::new(db.clone()),
            participants: ParticipantService::new(db.clone()),
            presence: PresenceService::new(db.clone()),
            jwt,
            config: Arc::new(config),
            db,
        }
    }
}
