pub mod jwt_auth;
pub mod presence;

pub use jwt_auth::{AuthenticatedUser, JwtAuthMiddleware};
pub use presence::{PresenceMiddleware, SkipPresence};

use actix_web::{dev::ServiceRequest, http::header, HttpMessage};

/// Access token from `Authorization: Bearer`, falling back to the auth cookie
pub(crate) fn request_token(req: &ServiceRequest, cookie_name: &str) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        req.cookie(cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_wins_over_cookie() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .cookie(Cookie::new("chat_auth", "from-cookie"))
            .to_srv_request();
        assert_eq!(request_token(&req, "chat_auth").as_deref(), Some("from-header"));
    }

    #[test]
    fn test_cookie_fallback() {
        let req = TestRequest::default()
            .cookie(Cookie::new("chat_auth", "from-cookie"))
            .to_srv_request();
        assert_eq!(request_token(&req, "chat_auth").as_deref(), Some("from-cookie"));
        assert_eq!(request_token(&req, "other"), None);
    }

    #[test]
    fn test_non_bearer_scheme_is_ignored() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_srv_request();
        assert_eq!(request_token(&req, "chat_auth"), None);
    }
}
