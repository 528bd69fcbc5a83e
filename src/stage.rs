//! Render surface the carousel drives.
//!
//! A [`Stage`] stands in for the carousel container: it receives slides,
//! transforms and loading hints in the order the engine decides them.
//! [`StageHost::mount`] is the only way to get one, so a missing container
//! surfaces once as a [`MountError`] instead of at every call site.

use std::fmt;

use tracing::{debug, trace};

use crate::error::MountError;
use crate::photos::Variant;
use crate::preload::ImageSlot;

/// Horizontal translation of the slide strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Offset {
    /// Multiples of the container width, desktop.
    Percent(f32),
    /// Absolute pixels, mobile.
    Pixels(f32),
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(v) => write!(f, "translateX({v}%)"),
            Self::Pixels(v) => write!(f, "translateX({v}px)"),
        }
    }
}

/// Whether an offset change is animated.
///
/// `Instant` means: disable the transition, apply, force one layout pass,
/// then re-enable the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Animated,
    Instant,
}

/// The `loading` attribute of an image element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingHint {
    Eager,
    Lazy,
}

impl LoadingHint {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eager => "eager",
            Self::Lazy => "lazy",
        }
    }
}

/// One position in the slide strip.
#[derive(Debug, Clone)]
pub struct Slide {
    pub images: Vec<ImageSlot>,
    /// Index of the real slide this one duplicates, for loop clones.
    pub clone_of: Option<usize>,
}

impl Slide {
    pub fn new(images: Vec<ImageSlot>) -> Self {
        Self {
            images,
            clone_of: None,
        }
    }

    /// Copy of this slide at `real_index` with fresh image slots.
    pub fn cloned_from(&self, real_index: usize) -> Self {
        Self {
            images: self.images.iter().map(ImageSlot::duplicate).collect(),
            clone_of: Some(real_index),
        }
    }
}

pub trait Stage: Send + 'static {
    /// Remove every slide and indicator.
    fn clear(&mut self);
    fn append_slide(&mut self, slide: &Slide, hint: LoadingHint);
    fn set_loading(&mut self, slide: usize, hint: LoadingHint);
    fn set_offset(&mut self, offset: Offset, motion: Motion);
    /// Live width of the container in pixels.
    fn container_width(&self) -> f32;

    fn render_indicators(&mut self, _count: usize) {}
    fn set_active_indicator(&mut self, _index: usize) {}
    /// The current touch is a horizontal drag; stop the page from scrolling.
    fn suppress_scroll(&mut self) {}
}

/// Provides a stage for a variant, or fails if its container is absent.
pub trait StageHost: Send {
    type Stage: Stage;

    fn mount(&mut self, variant: Variant) -> Result<Self::Stage, MountError>;
}

/// Headless stage that reports every operation through `tracing`.
#[derive(Debug)]
pub struct TracingStage {
    variant: Variant,
    width: f32,
    slides: usize,
}

impl Stage for TracingStage {
    fn clear(&mut self) {
        debug!(variant = %self.variant, slides = self.slides, "stage cleared");
        self.slides = 0;
    }

    fn append_slide(&mut self, slide: &Slide, hint: LoadingHint) {
        let sources: Vec<&str> = slide.images.iter().map(ImageSlot::src).collect();
        trace!(
            variant = %self.variant,
            position = self.slides,
            clone_of = ?slide.clone_of,
            loading = hint.as_str(),
            ?sources,
            "slide appended"
        );
        self.slides += 1;
    }

    fn set_loading(&mut self, slide: usize, hint: LoadingHint) {
        trace!(variant = %self.variant, slide, loading = hint.as_str(), "loading hint");
    }

    fn set_offset(&mut self, offset: Offset, motion: Motion) {
        debug!(variant = %self.variant, transform = %offset, ?motion, "transform");
    }

    fn container_width(&self) -> f32 {
        self.width
    }

    fn render_indicators(&mut self, count: usize) {
        trace!(variant = %self.variant, count, "indicators rendered");
    }

    fn set_active_indicator(&mut self, index: usize) {
        trace!(variant = %self.variant, index, "active indicator");
    }

    fn suppress_scroll(&mut self) {
        trace!(variant = %self.variant, "page scroll suppressed");
    }
}

/// Hands out [`TracingStage`]s sized to the current viewport.
#[derive(Debug, Clone)]
pub struct TracingStageHost {
    width: f32,
}

impl TracingStageHost {
    pub fn new(width: f32) -> Self {
        Self { width }
    }
}

impl StageHost for TracingStageHost {
    type Stage = TracingStage;

    fn mount(&mut self, variant: Variant) -> Result<TracingStage, MountError> {
        Ok(TracingStage {
            variant,
            width: self.width,
            slides: 0,
        })
    }
}
