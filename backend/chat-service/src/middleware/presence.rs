/// Presence refresh after successful requests.
///
/// Once the inner service has answered with 2xx/3xx, the access token (if
/// any) is decoded without expiry/audience checks and its user is marked
/// active. Nothing in this path can fail or alter the response.
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use super::request_token;
use crate::state::AppState;

/// Response extension that suppresses the presence refresh (set by logout)
#[derive(Debug, Clone, Copy)]
pub struct SkipPresence;

pub struct PresenceMiddleware;

impl<S, B> Transform<S, ServiceRequest> for PresenceMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = PresenceMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PresenceMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct PresenceMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for PresenceMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = state
            .as_ref()
            .and_then(|state| request_token(&req, &state.config.cookie.name));

        Box::pin(async move {
            let res = service.call(req).await?;

            let status = res.status();
            let skipped = res.response().extensions().get::<SkipPresence>().is_some();
            if !(status.is_success() || status.is_redirection()) || skipped {
                return Ok(res);
            }

            if let (Some(state), Some(token)) = (state, token) {
                refresh(&state, &token).await;
            }

            Ok(res)
        })
    }
}

async fn refresh(state: &AppState, token: &str) {
    let user_id = match state.jwt.decode_relaxed(token) {
        Ok(data) => match data.claims.user_id() {
            Some(id) => id,
            None => {
                tracing::debug!("Presence: token subject is not a user id");
                return;
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "Presence: token could not be decoded");
            return;
        }
    };

    match state.presence.mark_active(user_id).await {
        Ok(true) => {}
        Ok(false) => tracing::debug!(user_id = %user_id, "Presence: no such user"),
        Err(e) => tracing::warn!(user_id = %user_id, error = %e, "Presence update failed"),
    }
}
