//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors go through `throttle::AppError`.

mod settings;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, http,
    http::{Method, header},
};
use platform::clock::{Clock, SystemClock};
use sqlx::postgres::PgPoolOptions;
use throttle::domain::repository::AttemptStateRepository;
use throttle::{MemoryAttemptStore, PgAttemptStore, ThrottleAppState, throttle_router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::settings::{Settings, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,throttle=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let idle_secs = settings.throttle.attempts_timeout.as_secs();

    tracing::info!(
        max_attempts = settings.throttle.max_attempts,
        attempts_timeout_secs = idle_secs,
        "Throttle configured"
    );

    let api = match &settings.store {
        StoreBackend::Memory => {
            let store = MemoryAttemptStore::new();

            let sweeper = store.clone();
            let sweep_clock = clock.clone();
            spawn_sweeper(idle_secs, move || {
                sweeper.purge_idle(sweep_clock.unix_secs(), idle_secs as i64);
            });

            tracing::info!("Using in-memory attempt store");
            build_api(store, clock, &settings)?
        }
        StoreBackend::Postgres { database_url } => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;

            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let store = PgAttemptStore::new(pool);

            // Errors here should not prevent server startup
            if let Err(e) = store.cleanup_idle(clock.unix_secs() - idle_secs as i64).await {
                tracing::warn!(error = %e, "Attempt state cleanup failed, continuing anyway");
            }

            let sweeper = store.clone();
            let sweep_clock = clock.clone();
            spawn_sweeper(idle_secs, move || {
                let sweeper = sweeper.clone();
                let cutoff = sweep_clock.unix_secs() - idle_secs as i64;
                tokio::spawn(async move {
                    if let Err(e) = sweeper.cleanup_idle(cutoff).await {
                        tracing::warn!(error = %e, "Attempt state cleanup failed");
                    }
                });
            });

            build_api(store, clock, &settings)?
        }
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = settings
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([Method::POST, Method::OPTIONS]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_credentials(true);

    let app = Router::new()
        .nest("/api/throttle", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    tracing::info!("Listening on {}", settings.bind_addr);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_api<R>(repo: R, clock: Arc<dyn Clock>, settings: &Settings) -> anyhow::Result<Router>
where
    R: AttemptStateRepository + Clone + Send + Sync + 'static,
{
    let state = ThrottleAppState::new(repo, clock, &settings.throttle)?;
    Ok(throttle_router(state))
}

/// Run `sweep` once per attempts window
fn spawn_sweeper(period_secs: u64, sweep: impl Fn() + Send + 'static) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(period_secs.max(1)));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            sweep();
        }
    });
}
