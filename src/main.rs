use anyhow::{Context, Result};
use bucket_gateway::{build_app, build_store, config::AppConfig};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args().context("cannot init server")?;

    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.log_level())),
        )
        .init();

    tracing::info!("Starting bucket-gateway with config: {:?}", cfg);

    // --- Initialize storage client ---
    let store = build_store(&cfg).context("cannot init storage client")?;
    match &cfg.local_root {
        Some(root) => tracing::info!("Serving bucket {} from {}", cfg.bucket, root.display()),
        None => tracing::info!("Serving bucket {} from Google Cloud Storage", cfg.bucket),
    }

    // --- Build router ---
    let app = build_app(&cfg, store);

    // --- Start server ---
    let listener = TcpListener::bind(&cfg.addr)
        .await
        .with_context(|| format!("binding {}", cfg.addr))?;

    tracing::info!("listening on http://{}", listener.local_addr()?);
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("server has stopped: {}", err);
        return Err(err.into());
    }

    Ok(())
}
