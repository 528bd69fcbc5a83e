//! Desktop/mobile selection and the lifecycle of the mounted carousel.

use anyhow::Result;
use tokio::select;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::carousel::engine::EngineHandle;
use crate::config::{CarouselOptions, ViewportOptions};
use crate::events::{CarouselCommand, ViewportSignals};
use crate::photos::{PhotoSource, Variant, fetch_or_empty};
use crate::preload::{ImageFetcher, Preloader};
use crate::stage::StageHost;

impl ViewportSignals {
    /// Mobile when the viewport is narrower than `breakpoint_px` or the
    /// primary pointer is coarse.
    pub fn variant(&self, breakpoint_px: u32) -> Variant {
        if self.width_px < breakpoint_px || self.coarse_pointer {
            Variant::Mobile
        } else {
            Variant::Desktop
        }
    }
}

/// Owns the single active carousel and swaps it when the variant changes.
///
/// Each mount gets its own engine task and cancellation token; the previous
/// one is cancelled and awaited before the next photo fetch starts, so two
/// engines never run at once.
pub struct VariantSelector<P, H, F> {
    source: P,
    host: H,
    preloader: Preloader<F>,
    carousel: CarouselOptions,
    viewport: ViewportOptions,
    current: Option<Variant>,
    active: Option<EngineHandle>,
    cancel: CancellationToken,
}

impl<P, H, F> VariantSelector<P, H, F>
where
    P: PhotoSource,
    H: StageHost,
    F: ImageFetcher,
{
    pub fn new(
        source: P,
        host: H,
        preloader: Preloader<F>,
        carousel: CarouselOptions,
        viewport: ViewportOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            host,
            preloader,
            carousel,
            viewport,
            current: None,
            active: None,
            cancel,
        }
    }

    /// Variant chosen by the last evaluation, mounted or not.
    pub fn variant(&self) -> Option<Variant> {
        self.current
    }

    /// The running engine, if the current variant has one.
    pub fn active(&self) -> Option<&EngineHandle> {
        self.active.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Re-evaluate the signals. Returns `true` when the variant changed.
    pub async fn apply(&mut self, signals: ViewportSignals) -> bool {
        let variant = signals.variant(self.viewport.mobile_breakpoint_px);
        if self.current == Some(variant) {
            debug!(%variant, ?signals, "viewport change keeps variant");
            if let Some(active) = &self.active {
                if !active.deliver(CarouselCommand::Relayout).await {
                    debug!(%variant, "carousel gone; relayout dropped");
                }
            }
            return false;
        }

        self.teardown().await;
        self.current = Some(variant);
        info!(%variant, ?signals, "activating carousel variant");

        let photos = fetch_or_empty(&self.source, variant).await;
        if photos.is_empty() {
            info!(%variant, "no photos; carousel stays hidden");
            return true;
        }
        let stage = match self.host.mount(variant) {
            Ok(stage) => stage,
            Err(err) => {
                warn!(%variant, error = %err, "carousel not mounted");
                return true;
            }
        };
        match EngineHandle::spawn(
            variant,
            &photos,
            stage,
            self.preloader.clone(),
            self.carousel.clone(),
            self.cancel.child_token(),
        ) {
            Ok(handle) => self.active = Some(handle),
            Err(err) => warn!(%variant, error = %err, "carousel not mounted"),
        }
        true
    }

    /// Stop the active engine, if any, and wait for it to clear its stage.
    pub async fn teardown(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(variant = %active.variant(), "tearing down carousel");
            active.shutdown().await;
        }
    }

    /// Follow `signals` until cancelled or the sender is dropped.
    pub async fn run(mut self, mut signals: watch::Receiver<ViewportSignals>) -> Result<()> {
        let initial = *signals.borrow_and_update();
        self.apply(initial).await;
        loop {
            select! {
                _ = self.cancel.cancelled() => break,
                changed = signals.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let next = *signals.borrow_and_update();
                    self.apply(next).await;
                }
            }
        }
        self.teardown().await;
        Ok(())
    }
}
