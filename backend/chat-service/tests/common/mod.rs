#![allow(dead_code)]

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    test, web, App, Error,
};
use chat_service::{
    config::Config, db, middleware::PresenceMiddleware, routes::configure_routes, AppState,
};
use db_pool::{create_pool, DbConfig};
use serde_json::{json, Value};

pub const PASSWORD: &str = "password123";

pub async fn test_state() -> AppState {
    let config = Config {
        database: DbConfig::in_memory("chat-service-it"),
        ..Config::default()
    };
    let pool = create_pool(config.database.clone())
        .await
        .expect("in-memory pool");
    db::run_migrations(&pool).await.expect("migrations");
    AppState::new(pool, config)
}

/// The production router and app-level middleware over `state`
pub async fn init_app(
    state: AppState,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(PresenceMiddleware)
            .configure(configure_routes),
    )
    .await
}

pub struct TestUser {
    pub id: String,
    pub username: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

pub async fn register<S, B>(app: &S, username: &str) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": format!("{}@example.com", username),
            "username": username,
            "password": PASSWORD,
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "register {}", username);
    test::read_body_json(resp).await
}

pub async fn login<S, B>(app: &S, login: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/jwt/login")
        .set_json(json!({ "username": login, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login {}", login);
    let body: Value = test::read_body_json(resp).await;
    body["access_token"]
        .as_str()
        .expect("access_token")
        .to_string()
}

pub async fn signup<S, B>(app: &S, username: &str) -> TestUser
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let user = register(app, username).await;
    let token = login(app, username).await;
    TestUser {
        id: user["id"].as_str().expect("id").to_string(),
        username: username.to_string(),
        token,
    }
}

/// Create a conversation from `creator` to `invitee`; returns the detail body
pub async fn start_conversation<S, B>(
    app: &S,
    creator: &TestUser,
    invitee: &TestUser,
    message: &str,
) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/conversations")
        .insert_header(creator.bearer())
        .set_json(json!({
            "invitee_user_id": invitee.id,
            "initial_message": message,
            "name": "Project Chat",
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201);
    test::read_body_json(resp).await
}
