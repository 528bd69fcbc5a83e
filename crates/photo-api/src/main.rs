use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use photo_api::{ListingConfig, router};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "photo-api", version, about = "Serve the carousel photo listing.")]
struct Cli {
    /// Directory holding the published photos.
    #[arg(long, default_value = "static/photos")]
    photos_dir: PathBuf,

    /// URL path the photo directory is published under.
    #[arg(long, default_value = "/static/photos")]
    public_prefix: String,

    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    if let Err(err) = try_main().await {
        error!(error = ?err, "photo-api exited with error");
        std::process::exit(1);
    }
}

async fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let app = router(ListingConfig {
        root: cli.photos_dir.clone(),
        public_prefix: cli.public_prefix,
    });

    let listener = TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind listener on {}", cli.bind))?;
    info!(addr = %cli.bind, root = %cli.photos_dir.display(), "photo listing server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
        })
        .await
        .context("photo listing server exited")?;
    Ok(())
}
