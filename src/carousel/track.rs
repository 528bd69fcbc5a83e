//! Slide strip for one mount: the slides handed to the stage and the index
//! arithmetic that moves across them.

use crate::carousel::card::CardTrack;
use crate::carousel::trio::TrioTrack;
use crate::photos::{Photo, Variant, group_photos};
use crate::preload::ImageSlot;
use crate::stage::{Offset, Slide};

/// Result of one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Clone position to leave instantly before animating.
    pub jump: Option<usize>,
    /// Position to animate to.
    pub index: usize,
    /// Snap to schedule once the animation has finished.
    pub settle: Option<Settle>,
}

/// Un-animated correction from a clone back onto its real slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settle {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone)]
enum Kind {
    Trio(TrioTrack),
    Card(CardTrack),
}

#[derive(Debug, Clone)]
pub struct Track {
    kind: Kind,
    slides: Vec<Slide>,
}

impl Track {
    /// Lay out `photos` for `variant`. `None` when there is nothing to show.
    pub fn build(variant: Variant, photos: &[Photo], trio_size: usize) -> Option<Self> {
        match variant {
            Variant::Desktop => {
                let real: Vec<Slide> = group_photos(photos, trio_size)
                    .into_iter()
                    .map(|group| Slide::new(group.into_iter().map(ImageSlot::new).collect()))
                    .collect();
                let track = TrioTrack::new(real.len())?;
                let last = real.len() - 1;
                let mut slides = Vec::with_capacity(real.len() + 2);
                slides.push(real[last].cloned_from(last));
                let first = real[0].cloned_from(0);
                slides.extend(real);
                slides.push(first);
                Some(Self {
                    kind: Kind::Trio(track),
                    slides,
                })
            }
            Variant::Mobile => {
                let track = CardTrack::new(photos.len())?;
                let slides = photos
                    .iter()
                    .cloned()
                    .map(|p| Slide::new(vec![ImageSlot::new(p)]))
                    .collect();
                Some(Self {
                    kind: Kind::Card(track),
                    slides,
                })
            }
        }
    }

    pub fn variant(&self) -> Variant {
        match self.kind {
            Kind::Trio(_) => Variant::Desktop,
            Kind::Card(_) => Variant::Mobile,
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn index(&self) -> usize {
        match &self.kind {
            Kind::Trio(t) => t.index(),
            Kind::Card(c) => c.index(),
        }
    }

    pub fn next(&mut self) -> Step {
        match &mut self.kind {
            Kind::Trio(t) => t.next(),
            Kind::Card(c) => c.next(),
        }
    }

    pub fn prev(&mut self) -> Step {
        match &mut self.kind {
            Kind::Trio(t) => t.prev(),
            Kind::Card(c) => c.prev(),
        }
    }

    pub fn go_to(&mut self, index: usize) -> Step {
        match &mut self.kind {
            Kind::Trio(t) => t.go_to(index),
            Kind::Card(c) => c.go_to(index),
        }
    }

    pub fn settle(&mut self, settle: Settle) -> bool {
        match &mut self.kind {
            Kind::Trio(t) => t.settle(settle),
            Kind::Card(_) => false,
        }
    }

    /// Transform that shows `index`. Mobile depends on the live container width.
    pub fn offset(&self, index: usize, container_width: f32, card_gap: f32) -> Offset {
        match self.kind {
            Kind::Trio(_) => Offset::Percent(index as f32 * -100.0),
            Kind::Card(_) => Offset::Pixels(index as f32 * -(container_width + card_gap)),
        }
    }

    pub fn neighbours(&self, index: usize) -> Vec<usize> {
        match &self.kind {
            Kind::Trio(t) => t.neighbours(index),
            Kind::Card(c) => c.neighbours(index),
        }
    }

    /// Mobile shows one indicator per photo.
    pub fn indicator_count(&self) -> Option<usize> {
        match &self.kind {
            Kind::Trio(_) => None,
            Kind::Card(c) => Some(c.count()),
        }
    }
}
