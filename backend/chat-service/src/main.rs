use actix_cors::Cors;
use actix_middleware::{Logging, MetricsMiddleware, RequestId};
use actix_web::{web, App, HttpServer};
use std::io;
use std::time::Duration;

use chat_service::{
    config::Config,
    db::run_migrations,
    jobs::spawn_presence_sweeper,
    logging,
    middleware::PresenceMiddleware,
    routes::configure_routes,
    state::AppState,
};
use db_pool::create_pool;

fn io_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    logging::init_tracing();

    let config = Config::from_env().map_err(|e| io_error("Failed to load configuration", e))?;

    // Administrative subcommands: `migrate`, `promote-superuser <email>`
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(cmd) = args.first() {
        return run_command(cmd, &args[1..], config).await;
    }

    tracing::info!("Starting chat-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    config.database.log_config();
    let db_pool = create_pool(config.database.clone())
        .await
        .map_err(|e| io_error("Failed to create database pool", e))?;

    if config.run_migrations {
        tracing::info!("Running database migrations...");
        run_migrations(&db_pool)
            .await
            .map_err(|e| io_error("Database migrations failed", e))?;
        tracing::info!("Database migrations completed");
    } else {
        tracing::info!("Skipping database migrations (RUN_MIGRATIONS=false)");
    }

    let bind_address = config.bind_address();
    let sweep_every = Duration::from_secs(config.presence.sweep_interval_secs);
    let online_timeout = chrono::Duration::try_seconds(config.presence.online_timeout_secs)
        .ok_or_else(|| {
            io_error(
                "Invalid presence timeout",
                config.presence.online_timeout_secs,
            )
        })?;
    let is_production = config.is_production();

    let state = AppState::new(db_pool.clone(), config);
    let sweeper = spawn_presence_sweeper(state.presence.clone(), online_timeout, sweep_every);

    let app_state = web::Data::new(state);
    tracing::info!("Listening on {}", bind_address);

    let result = HttpServer::new(move || {
        let cors = if is_production {
            Cors::default()
                .allow_any_header()
                .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
                .supports_credentials()
                .max_age(3600)
        } else {
            Cors::permissive()
        };

        App::new()
            .app_data(app_state.clone())
            .app_data(web::JsonConfig::default().limit(64 * 1024))
            .wrap(PresenceMiddleware)
            .wrap(MetricsMiddleware)
            .wrap(Logging)
            .wrap(RequestId::new())
            .wrap(cors)
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await;

    sweeper.abort();
    db_pool.close().await;
    tracing::info!("chat-service stopped");

    result
}

async fn run_command(cmd: &str, args: &[String], config: Config) -> io::Result<()> {
    let db_pool = create_pool(config.database.clone())
        .await
        .map_err(|e| io_error("Failed to create database pool", e))?;

    match cmd {
        "migrate" => {
            run_migrations(&db_pool)
                .await
                .map_err(|e| io_error("Database migrations failed", e))?;
            tracing::info!("Database migrations completed");
        }
        "promote-superuser" => {
            let email = args.first().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "usage: chat-service promote-superuser <email>",
                )
            })?;
            let state = AppState::new(db_pool.clone(), config);
            let user = state
                .users
                .set_superuser(email, true)
                .await
                .map_err(|e| io_error("Failed to promote user", e))?;
            tracing::info!(user_id = %user.id, username = %user.username, "User promoted to superuser");
        }
        other => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unknown command: {}", other),
            ));
        }
    }

    db_pool.close().await;
    Ok(())
}
