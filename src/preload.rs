//! Image cache warm-up.
//!
//! Every image on a stage owns an [`ImageSlot`] whose flag records whether
//! its source has been fetched in the background. Warm-ups are detached
//! tasks that only touch the slot they were given.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::photos::Photo;

const IDLE: u8 = 0;
const IN_FLIGHT: u8 = 1;
const PRELOADED: u8 = 2;

/// An image element on a stage together with its `preloaded` marker.
#[derive(Debug, Clone)]
pub struct ImageSlot {
    photo: Photo,
    state: Arc<AtomicU8>,
}

impl ImageSlot {
    pub fn new(photo: Photo) -> Self {
        Self {
            photo,
            state: Arc::new(AtomicU8::new(IDLE)),
        }
    }

    /// A fresh slot for the same photo, used for loop clones.
    pub fn duplicate(&self) -> Self {
        Self::new(self.photo.clone())
    }

    pub fn photo(&self) -> &Photo {
        &self.photo
    }

    pub fn src(&self) -> &str {
        &self.photo.url
    }

    pub fn is_preloaded(&self) -> bool {
        self.state.load(Ordering::Acquire) == PRELOADED
    }

    /// Claim the slot for a warm-up. Fails when one is running or already done.
    fn begin(&self) -> bool {
        self.state
            .compare_exchange(IDLE, IN_FLIGHT, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn finish(&self, ok: bool) {
        self.state
            .store(if ok { PRELOADED } else { IDLE }, Ordering::Release);
    }
}

/// Fetches an image source so later loads hit a warm cache.
pub trait ImageFetcher: Send + Sync + 'static {
    fn fetch(&self, src: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Warms images over HTTP and discards the bytes.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building image warm-up client")?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, src: &str) -> Result<()> {
        self.client
            .get(src)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(())
    }
}

/// Spawns warm-ups for slots that are not yet preloaded.
#[derive(Debug)]
pub struct Preloader<F> {
    fetcher: Arc<F>,
}

impl<F> Clone for Preloader<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<F: ImageFetcher> Preloader<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    /// Start warming `slot`. Returns `None` when it is already preloaded or in flight.
    ///
    /// A failed fetch is logged and resets the slot so a later pass can retry.
    pub fn preload(&self, slot: &ImageSlot) -> Option<JoinHandle<()>> {
        if !slot.begin() {
            return None;
        }
        let slot = slot.clone();
        let fetcher = Arc::clone(&self.fetcher);
        Some(tokio::spawn(async move {
            match fetcher.fetch(slot.src()).await {
                Ok(()) => {
                    slot.finish(true);
                    debug!(src = slot.src(), "preloaded image");
                }
                Err(err) => {
                    slot.finish(false);
                    warn!(src = slot.src(), error = %err, "failed to preload image");
                }
            }
        }))
    }
}
