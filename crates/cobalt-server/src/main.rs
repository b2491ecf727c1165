mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use cobalt_ai::{OpenAiClient, QueryIntentResolver, Transcriber};
use cobalt_core::{AppConfig, ProviderState};
use cobalt_discovery::{DiscoveryAggregator, PgCatalog};
use cobalt_maps::PlacesGateway;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = cobalt_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting cobalt-server");

    let pool_config = cobalt_db::PoolConfig::from_app_config(&config);
    let pool = cobalt_db::connect_pool(&config.database_url, pool_config).await?;
    cobalt_db::run_migrations(&pool).await?;

    let state = build_state(pool, &config)?;
    let app = build_app(state, &config.cors_origins, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Wires the provider clients and the discovery aggregator once at startup.
fn build_state(pool: PgPool, config: &AppConfig) -> anyhow::Result<AppState> {
    let timeout_secs = config.provider_timeout_secs;

    let maps = Arc::new(PlacesGateway::from_api_key(
        config.maps_api_key.as_deref(),
        timeout_secs,
    )?);
    if !maps.is_available() {
        tracing::warn!("GOOGLE_MAPS_API_KEY not set; external place search disabled");
    }

    let openai = ProviderState::try_from_credential(config.openai_api_key.as_deref(), |key| {
        OpenAiClient::new(key, &config.openai_model, timeout_secs)
    })?;
    if !openai.is_available() {
        tracing::warn!("OPENAI_API_KEY not set; intent resolution and transcription disabled");
    }
    if config.elevenlabs_api_key.is_some() {
        tracing::info!("ELEVENLABS_API_KEY set; transcription still runs through Whisper");
    }

    let resolver = Arc::new(QueryIntentResolver::new(openai.clone()));
    let transcriber = Arc::new(Transcriber::new(openai));
    let discovery = Arc::new(DiscoveryAggregator::new(
        Arc::new(PgCatalog::new(pool.clone())),
        maps.clone(),
        resolver,
        Duration::from_secs(timeout_secs),
    ));

    Ok(AppState {
        pool,
        discovery,
        maps,
        transcriber,
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
