#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use photo_carousel::error::{MountError, PhotoFetchError};
use photo_carousel::photos::{Photo, PhotoSource, Variant};
use photo_carousel::preload::ImageFetcher;
use photo_carousel::stage::{LoadingHint, Motion, Offset, Slide, Stage, StageHost};

pub fn photos(n: usize) -> Vec<Photo> {
    (0..n)
        .map(|i| Photo {
            url: format!("/static/photos/{i:02}.jpg"),
            view_url: format!("/gallery/{i:02}"),
        })
        .collect()
}

/// Let spawned tasks process whatever is queued, without moving the clock.
pub async fn drain() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Clear,
    Append {
        sources: Vec<String>,
        clone_of: Option<usize>,
        hint: LoadingHint,
    },
    Loading(usize, LoadingHint),
    Offset(Offset, Motion),
    Indicators(usize),
    ActiveIndicator(usize),
    SuppressScroll,
}

#[derive(Debug, Clone)]
pub struct Recorder {
    pub variant: Variant,
    ops: Arc<Mutex<Vec<Op>>>,
}

impl Recorder {
    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<Op> {
        std::mem::take(&mut *self.ops.lock().unwrap())
    }

    pub fn offsets(&self) -> Vec<(Offset, Motion)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Offset(o, m) => Some((o, m)),
                _ => None,
            })
            .collect()
    }

    pub fn appended(&self) -> Vec<(Vec<String>, Option<usize>, LoadingHint)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Append {
                    sources,
                    clone_of,
                    hint,
                } => Some((sources, clone_of, hint)),
                _ => None,
            })
            .collect()
    }
}

pub struct RecordingStage {
    ops: Arc<Mutex<Vec<Op>>>,
    width: f32,
}

impl RecordingStage {
    pub fn new(variant: Variant, width: f32) -> (Self, Recorder) {
        let ops = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                ops: Arc::clone(&ops),
                width,
            },
            Recorder { variant, ops },
        )
    }

    fn push(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }
}

impl Stage for RecordingStage {
    fn clear(&mut self) {
        self.push(Op::Clear);
    }

    fn append_slide(&mut self, slide: &Slide, hint: LoadingHint) {
        self.push(Op::Append {
            sources: slide.images.iter().map(|s| s.src().to_string()).collect(),
            clone_of: slide.clone_of,
            hint,
        });
    }

    fn set_loading(&mut self, slide: usize, hint: LoadingHint) {
        self.push(Op::Loading(slide, hint));
    }

    fn set_offset(&mut self, offset: Offset, motion: Motion) {
        self.push(Op::Offset(offset, motion));
    }

    fn container_width(&self) -> f32 {
        self.width
    }

    fn render_indicators(&mut self, count: usize) {
        self.push(Op::Indicators(count));
    }

    fn set_active_indicator(&mut self, index: usize) {
        self.push(Op::ActiveIndicator(index));
    }

    fn suppress_scroll(&mut self) {
        self.push(Op::SuppressScroll);
    }
}

/// Host that records every stage it hands out.
#[derive(Clone, Default)]
pub struct RecordingHost {
    pub width: f32,
    pub missing: Option<Variant>,
    mounted: Arc<Mutex<Vec<Recorder>>>,
}

impl RecordingHost {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub fn mounted(&self) -> Vec<Recorder> {
        self.mounted.lock().unwrap().clone()
    }
}

impl StageHost for RecordingHost {
    type Stage = RecordingStage;

    fn mount(&mut self, variant: Variant) -> Result<RecordingStage, MountError> {
        if self.missing == Some(variant) {
            return Err(MountError::MissingContainer("carousel"));
        }
        let (stage, recorder) = RecordingStage::new(variant, self.width);
        self.mounted.lock().unwrap().push(recorder);
        Ok(stage)
    }
}

/// Fetcher that succeeds instantly unless the source is marked as failing.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    pub failing: Arc<Mutex<HashSet<String>>>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn fail(&self, src: &str) {
        self.failing.lock().unwrap().insert(src.to_string());
    }
}

impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, src: &str) -> Result<()> {
        self.fetched.lock().unwrap().push(src.to_string());
        if self.failing.lock().unwrap().contains(src) {
            bail!("boom: {src}");
        }
        Ok(())
    }
}

/// Fixed listing per variant, counting requests.
#[derive(Clone, Default)]
pub struct StaticSource {
    pub desktop: Vec<Photo>,
    pub mobile: Vec<Photo>,
    pub fail: bool,
    calls: Arc<AtomicUsize>,
}

impl StaticSource {
    pub fn new(desktop: Vec<Photo>, mobile: Vec<Photo>) -> Self {
        Self {
            desktop,
            mobile,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PhotoSource for StaticSource {
    async fn fetch_photos(&self, variant: Variant) -> Result<Vec<Photo>, PhotoFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PhotoFetchError::Status {
                status: 500,
                message: "listing unavailable".to_string(),
            });
        }
        Ok(match variant {
            Variant::Desktop => self.desktop.clone(),
            Variant::Mobile => self.mobile.clone(),
        })
    }
}
