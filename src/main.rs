//! Binary entrypoint for the photo carousel.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use photo_carousel::config::Configuration;
use photo_carousel::contact::{ContactForm, FieldArg, FormStatus, HttpFormTransport, LogView};
use photo_carousel::events::ViewportSignals;
use photo_carousel::photos::HttpPhotoSource;
use photo_carousel::preload::{HttpImageFetcher, Preloader};
use photo_carousel::stage::TracingStageHost;
use photo_carousel::viewport::VariantSelector;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "photo-carousel", about = "Photo carousel and contact form client")]
struct Cli {
    /// Path to YAML config file; built-in defaults when omitted
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the carousel headlessly, logging every stage operation.
    Preview {
        /// Viewport width in CSS pixels
        #[arg(long, default_value_t = 1280)]
        width: u32,
        /// Treat the primary pointer as coarse (touch)
        #[arg(long)]
        coarse_pointer: bool,
        /// Switch to this width after `--resize-after`
        #[arg(long, value_name = "PX")]
        resize_to: Option<u32>,
        #[arg(long, value_parser = humantime::parse_duration, default_value = "20s")]
        resize_after: Duration,
    },
    /// Submit the contact form.
    Contact {
        /// Form field as NAME=VALUE (repeatable)
        #[arg(short, long = "field", value_name = "NAME=VALUE")]
        fields: Vec<FieldArg>,
    },
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("photo_carousel={level}").parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("hyper_util=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    let cfg = cfg.validated().context("validating configuration")?;

    match cli.command {
        Command::Preview {
            width,
            coarse_pointer,
            resize_to,
            resize_after,
        } => preview(cfg, width, coarse_pointer, resize_to, resize_after).await,
        Command::Contact { fields } => contact(cfg, fields).await,
    }
}

async fn preview(
    cfg: Configuration,
    width: u32,
    coarse_pointer: bool,
    resize_to: Option<u32>,
    resize_after: Duration,
) -> Result<()> {
    let source = HttpPhotoSource::new(&cfg.photos)?;
    let preloader = Preloader::new(HttpImageFetcher::new(cfg.photos.request_timeout)?);
    let cancel = CancellationToken::new();
    let selector = VariantSelector::new(
        source,
        TracingStageHost::new(width as f32),
        preloader,
        cfg.carousel.clone(),
        cfg.viewport.clone(),
        cancel.clone(),
    );

    let (signals_tx, signals_rx) = watch::channel(ViewportSignals {
        width_px: width,
        coarse_pointer,
    });
    let selector_task = tokio::spawn(selector.run(signals_rx));
    info!(
        width,
        coarse_pointer,
        auto_scroll = %humantime::format_duration(cfg.carousel.auto_scroll_interval),
        "preview running; press Ctrl-C to stop"
    );

    if let Some(next_width) = resize_to {
        let resize_cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = resize_cancel.cancelled() => {}
                _ = tokio::time::sleep(resize_after) => {
                    info!(width = next_width, "simulating viewport resize");
                    signals_tx.send_modify(|s| s.width_px = next_width);
                    // Keep the channel open so the selector keeps running.
                    resize_cancel.cancelled().await;
                }
            }
        });
    }

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("shutting down preview");
    cancel.cancel();
    selector_task.await.context("selector task panicked")??;
    Ok(())
}

async fn contact(cfg: Configuration, fields: Vec<FieldArg>) -> Result<()> {
    let transport = HttpFormTransport::new(&cfg.contact)?;
    let mut form = ContactForm::new(transport, LogView::default(), &cfg.contact);
    for field in fields {
        form.fields_mut().set(field.name, field.value);
    }
    let status = form.submit().await.clone();
    form.hide_when_due().await;
    match status {
        FormStatus::Success => Ok(()),
        FormStatus::Failed(err) => bail!("contact form failed: {err}"),
        other => bail!("contact form ended in unexpected state {other:?}"),
    }
}
