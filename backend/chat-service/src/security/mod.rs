pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtService, MAX_ACCESS_TOKEN_TTL_SECS, TOKEN_AUDIENCE};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};
