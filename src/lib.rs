//! Photo carousel engine for the marketing site.
//!
//! A [`viewport::VariantSelector`] picks the desktop trio layout or the
//! mobile card layout, fetches the matching photo list through a
//! [`photos::PhotoSource`], and mounts one [`carousel::engine`] task onto a
//! [`stage::Stage`]. The contact form lives in [`contact`] and runs
//! independently.

pub mod config;
pub mod contact;
pub mod error;
pub mod events;
pub mod photos;
pub mod preload;
pub mod stage;
pub mod viewport;
pub mod carousel {
    pub mod autoscroll;
    pub mod card;
    pub mod engine;
    pub mod gesture;
    pub mod track;
    pub mod trio;
}
