/// JWT access tokens signed with HS256.
///
/// Tokens carry the user id as `sub` and a fixed audience. The auth
/// middleware validates strictly; the presence middleware only needs the
/// subject and tolerates expired tokens.
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode,
    errors::{Error as JwtError, ErrorKind},
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TOKEN_AUDIENCE: &str = "chat-service:auth";

/// Longest access token lifetime accepted (one year)
pub const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Subject as a user id, if it parses
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// `ttl_secs` is clamped to `1..=MAX_ACCESS_TOKEN_TTL_SECS`
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let ttl_secs = ttl_secs.clamp(1, MAX_ACCESS_TOKEN_TTL_SECS);
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::try_seconds(ttl_secs).unwrap_or_else(|| Duration::hours(1)),
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue an access token for `user_id`
    pub fn issue(&self, user_id: Uuid) -> Result<String, JwtError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| JwtError::from(ErrorKind::InvalidToken))?;
        let claims = Claims {
            sub: user_id.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Signature, expiry and audience are all enforced
    pub fn validate(&self, token: &str) -> Result<TokenData<Claims>, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
    }

    /// Signature only. Expired tokens and foreign audiences still decode.
    pub fn decode_relaxed(&self, token: &str) -> Result<TokenData<Claims>, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &self.decoding_key, &validation)
    }
}
