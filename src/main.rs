use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use folio_core::Config;
use folio_weather::WeatherService;

#[tokio::main]
async fn main() -> Result<()> {
    let (config, validation) = Config::load_validated()?;
    folio_core::init_logging(&config.logging.filter)?;
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    let weather = Arc::new(
        WeatherService::from_config(&config.upstream, &config.cache)
            .context("Failed to build weather service")?,
    );

    if config.cache.sweep_interval_secs > 0 {
        spawn_cache_sweeper(
            weather.clone(),
            Duration::from_secs(config.cache.sweep_interval_secs),
        );
    }

    let app = folio_api::api_router(weather)
        .layer(build_cors_layer(&config.server.cors_origins))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config
        .server
        .bind_addr()
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.server.bind_addr()))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to address {addr}"))?;

    tracing::info!(%addr, "Folio weather API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Periodically drop expired cache entries. Reads already expire lazily;
/// this only bounds memory held by keys that are never read again.
fn spawn_cache_sweeper(weather: Arc<WeatherService>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let removed = weather.purge_expired();
            if removed > 0 {
                tracing::debug!(removed, "Swept expired cache entries");
            }
        }
    });
}

/// Build CORS layer from configured origins. Any `"*"` entry allows every
/// origin; `AllowOrigin::list` rejects a wildcard.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if allows_any_origin(origins) {
        AllowOrigin::any()
    } else {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

fn allows_any_origin(origins: &[String]) -> bool {
    origins.iter().any(|o| o.trim() == "*")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
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
                tracing::error!("Failed to install SIGTERM handler: {e}");
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

    tracing::info!("Shutdown signal received");
}
