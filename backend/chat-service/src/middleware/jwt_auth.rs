/// JWT authentication middleware.
/// Resolves the access token to an active user and stores it in the request
/// extensions for the `AuthenticatedUser` extractor.
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use uuid::Uuid;

use super::request_token;
use crate::error::AppError;
use crate::models::User;
use crate::services::ServiceError;
use crate::state::AppState;

/// The user behind the request's access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

/// JWT authentication middleware factory
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let user = match authenticate(&req).await {
                Ok(user) => user,
                Err(e) => {
                    let response = e.error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            // All immutable borrows of the request are dropped by now
            req.extensions_mut().insert(AuthenticatedUser(user));

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

async fn authenticate(req: &ServiceRequest) -> Result<User, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state missing".into()))?;

    let token = request_token(req, &state.config.cookie.name)
        .ok_or_else(|| AppError::unauthorized("Missing access token"))?;

    let user_id = match state.jwt.validate(&token) {
        Ok(data) => data
            .claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid user ID in token"))?,
        Err(e) => {
            tracing::debug!("Token validation failed: {}", e);
            return Err(AppError::unauthorized("Invalid or expired token"));
        }
    };

    let user = match state.users.get_user(user_id).await {
        Ok(user) => user,
        Err(ServiceError::UserNotFound) => return Err(AppError::unauthorized("Unknown user")),
        Err(e) => return Err(e.into()),
    };
    if !user.is_active {
        return Err(AppError::unauthorized("Inactive user"));
    }

    Ok(user)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => ready(Err(AppError::unauthorized("Authentication required").into())),
        }
    }
}
