//! Jibreel Storefront - bilingual storefront and back office service

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jibreel_storefront::auth::AdminEmailAuthenticator;
use jibreel_storefront::publisher::{EventPublisher, NatsPublisher, NoopPublisher};
use jibreel_storefront::session::SessionStore;
use jibreel_storefront::store::{create_pool, MemoryStore, PgStore, Store};
use jibreel_storefront::upload::LocalBlobStore;
use jibreel_storefront::{router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(PgStore::new(create_pool(url, config.database_max_connections).await?, &config.currency)),
        None => {
            tracing::warn!("DATABASE_URL not set, serving the demo catalog from memory");
            Arc::new(MemoryStore::seeded(&config.currency))
        }
    };

    let events: Arc<dyn EventPublisher> = match &config.nats_url {
        Some(url) => match async_nats::connect(url).await {
            Ok(client) => Arc::new(NatsPublisher::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, domain events disabled");
                Arc::new(NoopPublisher)
            }
        },
        None => Arc::new(NoopPublisher),
    };

    let sessions = Arc::new(SessionStore::with_idle_timeout(&config.currency, config.session_idle_timeout));
    tokio::spawn(sweep_sessions(sessions.clone()));

    let state = AppState {
        store,
        sessions,
        auth: Arc::new(AdminEmailAuthenticator::new(&config.admin_email)),
        blobs: Arc::new(LocalBlobStore::new(&config.upload_dir, &config.upload_public_url)),
        events,
        currency: config.currency.clone(),
        contact_url: config.contact_url(),
    };

    let mut app = router(state);
    // Uploads published under an external URL are served by whatever hosts that URL.
    let uploads_path = config.upload_public_url.trim_end_matches('/');
    if uploads_path.starts_with('/') {
        app = app.nest_service(uploads_path, ServeDir::new(&config.upload_dir));
    }

    let addr = config.socket_addr();
    tracing::info!("🚀 Jibreel storefront listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn sweep_sessions(sessions: Arc<SessionStore>) {
    let mut tick = tokio::time::interval((sessions.idle_timeout() / 4).max(Duration::from_secs(30)));
    loop {
        tick.tick().await;
        sessions.evict_idle().await;
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
