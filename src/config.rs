use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use reqwest::Url;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Where the photo listing is fetched from.
    pub photos: PhotoSourceOptions,
    /// Carousel pacing and gesture tuning.
    pub carousel: CarouselOptions,
    /// Viewport classification.
    pub viewport: ViewportOptions,
    /// Contact form submission.
    pub contact: ContactOptions,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        self.photos.validate().context("invalid photos configuration")?;
        self.carousel
            .validate()
            .context("invalid carousel configuration")?;
        ensure!(
            self.viewport.mobile_breakpoint_px > 0,
            "viewport.mobile-breakpoint-px must be greater than zero"
        );
        self.contact.validate().context("invalid contact configuration")?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PhotoSourceOptions {
    /// Base URL of the site serving `/api/photos`.
    pub api_base_url: String,
    /// Upper bound for a single listing or image warm-up request.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl PhotoSourceOptions {
    fn validate(&self) -> Result<()> {
        Url::parse(&self.api_base_url)
            .with_context(|| format!("photos.api-base-url `{}` is not a URL", self.api_base_url))?;
        ensure!(
            !self.request_timeout.is_zero(),
            "photos.request-timeout must be positive"
        );
        Ok(())
    }
}

impl Default for PhotoSourceOptions {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CarouselOptions {
    /// Length of the animated slide. Loop snaps are scheduled this long after a move.
    #[serde(with = "humantime_serde")]
    pub transition: Duration,
    /// Period of the auto-scroll tick.
    #[serde(with = "humantime_serde")]
    pub auto_scroll_interval: Duration,
    /// Quiet time after a manual interaction before auto-scroll restarts.
    #[serde(with = "humantime_serde")]
    pub resume_delay: Duration,
    /// Delay before images outside the visible neighbourhood are warmed.
    #[serde(with = "humantime_serde")]
    pub lazy_preload_delay: Duration,
    /// Horizontal travel needed for a swipe to navigate.
    pub swipe_threshold_px: f32,
    /// Mobile only: travel before a touch counts as a horizontal drag.
    pub drag_deadzone_px: f32,
    /// Mobile only: margin between adjacent cards.
    pub card_gap_px: f32,
    /// Photos per desktop slide.
    pub trio_size: usize,
}

impl CarouselOptions {
    fn validate(&self) -> Result<()> {
        ensure!(
            !self.transition.is_zero(),
            "carousel.transition must be positive"
        );
        ensure!(
            self.auto_scroll_interval > self.transition,
            "carousel.auto-scroll-interval must be longer than carousel.transition"
        );
        ensure!(
            !self.resume_delay.is_zero(),
            "carousel.resume-delay must be positive"
        );
        ensure!(
            self.swipe_threshold_px > 0.0,
            "carousel.swipe-threshold-px must be positive"
        );
        ensure!(
            self.drag_deadzone_px >= 0.0 && self.drag_deadzone_px < self.swipe_threshold_px,
            "carousel.drag-deadzone-px must be non-negative and below the swipe threshold"
        );
        ensure!(
            self.card_gap_px >= 0.0,
            "carousel.card-gap-px must not be negative"
        );
        ensure!(self.trio_size > 0, "carousel.trio-size must be greater than zero");
        Ok(())
    }
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            transition: Duration::from_millis(500),
            auto_scroll_interval: Duration::from_secs(5),
            resume_delay: Duration::from_secs(10),
            lazy_preload_delay: Duration::from_secs(1),
            swipe_threshold_px: 50.0,
            drag_deadzone_px: 10.0,
            card_gap_px: 20.0,
            trio_size: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ViewportOptions {
    /// Viewports narrower than this are treated as mobile.
    pub mobile_breakpoint_px: u32,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            mobile_breakpoint_px: 768,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ContactOptions {
    /// Form-processing endpoint receiving the JSON body.
    pub endpoint: String,
    /// Value of the hidden `access_key` field. Empty means unconfigured.
    pub access_key: String,
    /// How long a result message stays visible.
    #[serde(with = "humantime_serde")]
    pub result_display: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl ContactOptions {
    fn validate(&self) -> Result<()> {
        Url::parse(&self.endpoint)
            .with_context(|| format!("contact.endpoint `{}` is not a URL", self.endpoint))?;
        ensure!(
            !self.result_display.is_zero(),
            "contact.result-display must be positive"
        );
        ensure!(
            !self.request_timeout.is_zero(),
            "contact.request-timeout must be positive"
        );
        Ok(())
    }
}

impl Default for ContactOptions {
    fn default() -> Self {
        Self {
            endpoint: "https://api.web3forms.com/submit".to_string(),
            access_key: String::new(),
            result_display: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
        }
    }
}
