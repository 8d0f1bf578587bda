mod app;

use accountd_core::{FileStore, SessionManager, TokenService, UserManager};
use app::{app_router, AppState};
use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
struct ApiConfig {
    bind: SocketAddr,
    data_dir: PathBuf,
    /// Token signing secret, shared by every token this process issues
    signing_secret: String,
    /// Allowed CORS origins (empty means any)
    cors_origins: Vec<String>,
}

impl ApiConfig {
    fn from_env() -> Self {
        let bind = env::var("ACCOUNTD_BIND")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));

        let data_dir = env::var("ACCOUNTD_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let signing_secret = env::var("ACCOUNTD_SIGNING_SECRET")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                warn!(
                    "ACCOUNTD_SIGNING_SECRET not set; generating a random secret for this run, \
                     issued tokens will not survive a restart"
                );
                uuid::Uuid::new_v4().to_string()
            });

        // Comma separated; empty or "*" allows any origin
        let cors_origins = env::var("ACCOUNTD_CORS_ORIGINS")
            .ok()
            .map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() || trimmed == "*" {
                    vec![]
                } else {
                    trimmed
                        .split(',')
                        .filter(|t| !t.trim().is_empty())
                        .map(|t| t.trim().to_string())
                        .collect()
                }
            })
            .unwrap_or_default();

        Self {
            bind,
            data_dir,
            signing_secret,
            cors_origins,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Read .env first, if present
    let _ = dotenv();
    init_tracing();

    let config = ApiConfig::from_env();
    info!("starting API on {}", config.bind);

    let store = Arc::new(FileStore::new(&config.data_dir));
    store.ensure_dirs().await?;

    let token_service = TokenService::new(config.signing_secret.clone(), store.clone());
    match token_service.sweep().await {
        Ok(removed) => info!(removed, "evicted stale revoked tokens"),
        Err(e) => warn!(error = %e, "startup sweep of revoked tokens failed"),
    }

    let state = AppState {
        user_manager: Arc::new(UserManager::new(store.clone())),
        session_manager: Arc::new(SessionManager::new(store, token_service.clone())),
        token_service: Arc::new(token_service),
    };

    let app = app_router(state, config.cors_origins.clone());
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API stopped");
    Ok(())
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
