use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use folio_server::{chat::GeminiClient, geo::locator_from_path, state::AppState};
use folio_store::JsonFileStore;

/// `folio health`: liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$FOLIO_PORT/api/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("FOLIO_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/api/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("folio_server=info".parse()?)
                .add_directive("folio_store=info".parse()?),
        )
        .json()
        .init();

    let cfg = folio_core::config::Config::from_env()?;

    // Creates the directory and empty documents if absent.
    let store = JsonFileStore::open(&cfg.data_dir)?;
    if !cfg.analytics_enabled {
        info!("Visit recording disabled (FOLIO_ANALYTICS=false)");
    }

    let geo = locator_from_path(&cfg.geoip_path);

    let chat = GeminiClient::from_config(&cfg)?;
    if chat.is_none() {
        warn!("FOLIO_GEMINI_API_KEY not set. Chat replies will use the fallback message.");
    }

    let mut state = AppState::new(Arc::new(store), cfg.clone()).with_geo_locator(geo);
    if let Some(chat) = chat {
        state = state.with_chat_client(Arc::new(chat));
    }
    let state = Arc::new(state);

    state.prune_old_data(chrono::Utc::now()).await;

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = folio_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, data_dir = %cfg.data_dir, "Folio listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        tokio::signal::ctrl_c().await.ok();
    })
    .await?;

    info!("Folio shut down");
    Ok(())
}
