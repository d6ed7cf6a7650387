//! Route configuration

use crate::handlers::{auth, conversations, health, participants, users};
use crate::middleware::JwtAuthMiddleware;
use actix_web::web;

/// Configure all routes for the application
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Public endpoints
        .route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(health::metrics))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register))
                .route("/jwt/login", web::post().to(auth::login))
                .service(
                    web::resource("/jwt/logout")
                        .wrap(JwtAuthMiddleware)
                        .route(web::post().to(auth::logout)),
                ),
        )
        // Authenticated API
        .service(
            web::scope("/users")
                .wrap(JwtAuthMiddleware)
                .route("", web::get().to(users::list_users))
                .route("/online", web::get().to(users::list_online_users))
                .service(
                    web::resource("/me")
                        .route(web::get().to(users::get_me))
                        .route(web::patch().to(users::update_me))
                        .route(web::delete().to(users::delete_me)),
                )
                .route("/me/profile", web::get().to(users::get_me))
                .route("/me/invitations", web::get().to(users::my_invitations))
                .route("/me/conversations", web::get().to(users::my_conversations))
                .route("/{username}", web::get().to(users::get_user)),
        )
        .service(
            web::scope("/conversations")
                .wrap(JwtAuthMiddleware)
                .service(
                    web::resource("")
                        .route(web::get().to(conversations::list_conversations))
                        .route(web::post().to(conversations::create_conversation)),
                )
                .route("/{slug}", web::get().to(conversations::get_conversation))
                .service(
                    web::resource("/{slug}/participants")
                        .route(web::get().to(conversations::list_participants))
                        .route(web::post().to(conversations::invite_participant)),
                )
                .service(
                    web::resource("/{slug}/messages")
                        .route(web::get().to(conversations::list_messages))
                        .route(web::post().to(conversations::create_message)),
                ),
        )
        .service(
            web::scope("/participants")
                .wrap(JwtAuthMiddleware)
                .route("/{id}", web::put().to(participants::update_participant)),
        );
}
