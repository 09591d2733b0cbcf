use std::sync::Arc;

use creatorhub::auth::{InitSignals, MockIdentity, provider_from_config};
use creatorhub::config::AuthConfig;
use creatorhub::session::{SessionDeps, SessionManager};
use creatorhub::state::AppState;
use creatorhub::store::{MemoryProfileStore, PgProfileStore, ProfileStore};
use creatorhub::{db, routes};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AuthConfig::from_env().expect("invalid auth configuration");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let store: Arc<dyn ProfileStore> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = db::init_pool(&database_url)
                .await
                .expect("database init failed");
            Arc::new(PgProfileStore::new(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; profiles are kept in memory");
            Arc::new(MemoryProfileStore::new())
        }
    };

    let identity = Arc::new(MockIdentity::standard());
    let provider = provider_from_config(&config, identity.clone()).expect("auth provider init failed");
    let signals = InitSignals::new();
    let session = SessionManager::mount(
        config,
        SessionDeps { provider, store, identity, signals: signals.clone() },
    );

    let app = routes::app(AppState::new(session.clone(), signals));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "creatorhub session api listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");

    session.unmount();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
