use crate::error::AppError;
use crate::security::MAX_ACCESS_TOKEN_TTL_SECS;
use db_pool::env_utils::{parse_env_flag, parse_env_optional, parse_env_with_default};
use db_pool::DbConfig;
use std::env;

const SERVICE_NAME: &str = "chat-service";
const DEV_JWT_SECRET: &str = "chat-service-development-secret-change-me";
/// Thirty days
const MAX_ONLINE_TIMEOUT_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DbConfig,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub presence: PresenceConfig,
    pub run_migrations: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_ttl: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
}

#[derive(Debug, Clone)]
pub struct PresenceConfig {
    /// Users inactive for longer than this are swept offline
    pub online_timeout_secs: i64,
    pub sweep_interval_secs: u64,
}

// Default value functions
fn default_app_env() -> String {
    "development".to_string()
}

fn default_app_host() -> String {
    "0.0.0.0".to_string()
}

fn default_app_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite://chat.db?mode=rwc".to_string()
}

fn default_jwt_access_ttl() -> i64 {
    3600
}

fn default_cookie_name() -> String {
    "chat_auth".to_string()
}

fn default_online_timeout_secs() -> i64 {
    300
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                env: default_app_env(),
                host: default_app_host(),
                port: default_app_port(),
            },
            database: DbConfig {
                service_name: SERVICE_NAME.to_string(),
                database_url: default_database_url(),
                ..DbConfig::default()
            },
            jwt: JwtConfig {
                secret: DEV_JWT_SECRET.to_string(),
                access_token_ttl: default_jwt_access_ttl(),
            },
            cookie: CookieConfig {
                name: default_cookie_name(),
                secure: false,
            },
            presence: PresenceConfig {
                online_timeout_secs: default_online_timeout_secs(),
                sweep_interval_secs: default_sweep_interval_secs(),
            },
            run_migrations: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let app = AppConfig {
            env: env::var("APP_ENV").unwrap_or_else(|_| default_app_env()),
            host: env::var("APP_HOST").unwrap_or_else(|_| default_app_host()),
            port: parse_env_with_default("APP_PORT", default_app_port()),
        };

        let secret = match parse_env_optional::<String>("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ if app.env == "production" => {
                return Err(AppError::Config(
                    "JWT_SECRET must be set in production".into(),
                ))
            }
            _ => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let jwt = JwtConfig {
            secret,
            access_token_ttl: parse_env_with_default(
                "JWT_ACCESS_TOKEN_TTL",
                default_jwt_access_ttl(),
            ),
        };
        if !(1..=MAX_ACCESS_TOKEN_TTL_SECS).contains(&jwt.access_token_ttl) {
            return Err(AppError::Config(format!(
                "JWT_ACCESS_TOKEN_TTL must be between 1 and {} seconds",
                MAX_ACCESS_TOKEN_TTL_SECS
            )));
        }

        let cookie = CookieConfig {
            name: env::var("AUTH_COOKIE_NAME").unwrap_or_else(|_| default_cookie_name()),
            secure: parse_env_flag("AUTH_COOKIE_SECURE", false),
        };

        let presence = PresenceConfig {
            online_timeout_secs: parse_env_with_default(
                "PRESENCE_ONLINE_TIMEOUT_SECS",
                default_online_timeout_secs(),
            ),
            sweep_interval_secs: parse_env_with_default(
                "PRESENCE_SWEEP_INTERVAL_SECS",
                default_sweep_interval_secs(),
            ),
        };
        if !(1..=MAX_ONLINE_TIMEOUT_SECS).contains(&presence.online_timeout_secs) {
            return Err(AppError::Config(format!(
                "PRESENCE_ONLINE_TIMEOUT_SECS must be between 1 and {} seconds",
                MAX_ONLINE_TIMEOUT_SECS
            )));
        }
        if presence.sweep_interval_secs == 0 {
            return Err(AppError::Config(
                "PRESENCE_SWEEP_INTERVAL_SECS must be at least 1".into(),
            ));
        }

        Ok(Self {
            app,
            database: DbConfig::from_env(SERVICE_NAME, &default_database_url()),
            jwt,
            cookie,
            presence,
            run_migrations: parse_env_flag("RUN_MIGRATIONS", true),
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 8] = [
        "APP_ENV",
        "APP_PORT",
        "JWT_SECRET",
        "JWT_ACCESS_TOKEN_TTL",
        "AUTH_COOKIE_SECURE",
        "PRESENCE_ONLINE_TIMEOUT_SECS",
        "PRESENCE_SWEEP_INTERVAL_SECS",
        "RUN_MIGRATIONS",
    ];

    fn clear() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear();
        let config = Config::from_env().unwrap();
        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.jwt.secret, DEV_JWT_SECRET);
        assert_eq!(config.jwt.access_token_ttl, 3600);
        assert_eq!(config.cookie.name, "chat_auth");
        assert!(!config.cookie.secure);
        assert_eq!(config.presence.online_timeout_secs, 300);
        assert_eq!(config.presence.sweep_interval_secs, 60);
        assert!(config.run_migrations);
        assert_eq!(config.database.service_name, "chat-service");
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear();
        env::set_var("APP_PORT", "9000");
        env::set_var("JWT_SECRET", "s3cret");
        env::set_var("AUTH_COOKIE_SECURE", "true");
        env::set_var("PRESENCE_ONLINE_TIMEOUT_SECS", "30");
        env::set_var("RUN_MIGRATIONS", "false");

        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.jwt.secret, "s3cret");
        assert!(config.cookie.secure);
        assert_eq!(config.presence.online_timeout_secs, 30);
        assert!(!config.run_migrations);

        clear();
    }

    #[test]
    #[serial]
    fn test_production_requires_secret() {
        clear();
        env::set_var("APP_ENV", "production");
        assert!(matches!(Config::from_env(), Err(AppError::Config(_))));

        env::set_var("JWT_SECRET", "prod-secret");
        let config = Config::from_env().unwrap();
        assert!(config.is_production());
        clear();
    }

    #[test]
    #[serial]
    fn test_rejects_zero_sweep_interval() {
        clear();
        env::set_var("PRESENCE_SWEEP_INTERVAL_SECS", "0");
        assert!(matches!(Config::from_env(), Err(AppError::Config(_))));
        clear();
    }

    #[test]
    #[serial]
    fn test_rejects_out_of_range_token_ttl() {
        for value in ["0", "-60", "10000000000000"] {
            clear();
            env::set_var("JWT_ACCESS_TOKEN_TTL", value);
            assert!(
                matches!(Config::from_env(), Err(AppError::Config(_))),
                "JWT_ACCESS_TOKEN_TTL={}",
                value
            );
        }

        clear();
        env::set_var("JWT_ACCESS_TOKEN_TTL", MAX_ACCESS_TOKEN_TTL_SECS.to_string());
        let config = Config::from_env().unwrap();
        assert_eq!(config.jwt.access_token_ttl, MAX_ACCESS_TOKEN_TTL_SECS);
        clear();
    }

    #[test]
    #[serial]
    fn test_rejects_out_of_range_online_timeout() {
        for value in ["0", "-5", "10000000000000"] {
            clear();
            env::set_var("PRESENCE_ONLINE_TIMEOUT_SECS", value);
            assert!(
                matches!(Config::from_env(), Err(AppError::Config(_))),
                "PRESENCE_ONLINE_TIMEOUT_SECS={}",
                value
            );
        }
        clear();
    }

    #[test]
    fn test_jwt_secret_is_redacted() {
        let rendered = format!("{:?}", Config::default());
        assert!(!rendered.contains(DEV_JWT_SECRET));
    }
}
