//! Photo descriptors and the client for the `/api/photos` listing.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::PhotoSourceOptions;
use crate::error::PhotoFetchError;

const GENERIC_LISTING_ERROR: &str = "failed to load photos";

/// One carousel image: the raster source and the page it links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    pub view_url: String,
}

/// Display mode chosen from viewport characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Desktop,
    Mobile,
}

impl Variant {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "desktop" => Ok(Self::Desktop),
            "mobile" => Ok(Self::Mobile),
            other => Err(format!("unknown variant `{other}`")),
        }
    }
}

/// Success body of the listing endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoListing {
    #[serde(default)]
    pub photos: Option<Vec<Photo>>,
}

/// Failure body of the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingError {
    pub error: String,
}

/// Anything that can produce the ordered photo list for a variant.
pub trait PhotoSource: Send + Sync {
    fn fetch_photos(
        &self,
        variant: Variant,
    ) -> impl Future<Output = Result<Vec<Photo>, PhotoFetchError>> + Send;
}

/// Listing client backed by `GET {base}/api/photos?variant=…`.
#[derive(Debug, Clone)]
pub struct HttpPhotoSource {
    client: Client,
    endpoint: Url,
}

impl HttpPhotoSource {
    pub fn new(opts: &PhotoSourceOptions) -> Result<Self> {
        let endpoint = Url::parse(&opts.api_base_url)
            .and_then(|base| base.join("/api/photos"))
            .with_context(|| format!("invalid photo api base url `{}`", opts.api_base_url))?;
        let client = Client::builder()
            .timeout(opts.request_timeout)
            .build()
            .context("building photo listing client")?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl PhotoSource for HttpPhotoSource {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_photos(&self, variant: Variant) -> Result<Vec<Photo>, PhotoFetchError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("variant", variant.as_str())])
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        let photos = parse_listing(status, &body)?;
        debug!(status, count = photos.len(), "photo listing received");
        Ok(photos)
    }
}

/// Interpret a listing response.
///
/// A 2xx body must be JSON; a missing or null `photos` field is an empty
/// list. Any other status is an error carrying the body's `error` field when
/// it has one.
pub fn parse_listing(status: u16, body: &[u8]) -> Result<Vec<Photo>, PhotoFetchError> {
    if (200..300).contains(&status) {
        let listing: PhotoListing = serde_json::from_slice(body)?;
        return Ok(listing.photos.unwrap_or_default());
    }
    let message = serde_json::from_slice::<ListingError>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| GENERIC_LISTING_ERROR.to_string());
    Err(PhotoFetchError::Status { status, message })
}

/// Fetch photos, logging failures and falling back to an empty list.
pub async fn fetch_or_empty<P: PhotoSource>(source: &P, variant: Variant) -> Vec<Photo> {
    match source.fetch_photos(variant).await {
        Ok(photos) => photos,
        Err(err) => {
            warn!(%variant, error = %err, "could not load photos; carousel stays hidden");
            Vec::new()
        }
    }
}

/// Split photos into display groups of `size`; the last group may be short.
pub fn group_photos(photos: &[Photo], size: usize) -> Vec<Vec<Photo>> {
    photos.chunks(size.max(1)).map(<[Photo]>::to_vec).collect()
}
