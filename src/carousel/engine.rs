//! One mounted carousel: a task that owns the track, the stage and every
//! timer of the mount.
//!
//! Timers are plain deadlines on [`Engine`], polled by a single `select!`
//! loop, so cancelling the task cancels them all and nothing outlives the
//! mount except detached image warm-ups.

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::carousel::autoscroll::{AutoScroll, AutoScrollEvent, wait_until};
use crate::carousel::gesture::{Swipe, SwipeTracker};
use crate::carousel::track::{Settle, Step, Track};
use crate::config::CarouselOptions;
use crate::error::MountError;
use crate::events::{CarouselCommand, Origin};
use crate::photos::{Photo, Variant};
use crate::preload::{ImageFetcher, Preloader};
use crate::stage::{LoadingHint, Motion, Stage};

const COMMAND_QUEUE: usize = 32;

#[derive(Debug, Clone, Copy)]
struct PendingSnap {
    settle: Settle,
    at: Instant,
}

/// Per-mount carousel state.
pub struct Engine<S, F> {
    track: Track,
    stage: S,
    preloader: Preloader<F>,
    opts: CarouselOptions,
    autoscroll: AutoScroll,
    swipe: SwipeTracker,
    snap: Option<PendingSnap>,
    lazy_at: Option<Instant>,
}

impl<S: Stage, F: ImageFetcher> Engine<S, F> {
    pub fn new(
        variant: Variant,
        photos: &[Photo],
        stage: S,
        preloader: Preloader<F>,
        opts: CarouselOptions,
    ) -> Result<Self, MountError> {
        let track = Track::build(variant, photos, opts.trio_size).ok_or(MountError::Empty)?;
        let deadzone = match variant {
            Variant::Desktop => None,
            Variant::Mobile => Some(opts.drag_deadzone_px),
        };
        Ok(Self {
            track,
            stage,
            preloader,
            autoscroll: AutoScroll::new(opts.auto_scroll_interval, opts.resume_delay),
            swipe: SwipeTracker::new(opts.swipe_threshold_px, deadzone),
            opts,
            snap: None,
            lazy_at: None,
        })
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Build the strip on the stage and position it without animation.
    fn mount(&mut self) {
        self.stage.clear();
        let visible = self.track.index();
        for (position, slide) in self.track.slides().iter().enumerate() {
            let hint = if position == visible {
                LoadingHint::Eager
            } else {
                LoadingHint::Lazy
            };
            self.stage.append_slide(slide, hint);
        }
        if let Some(count) = self.track.indicator_count() {
            self.stage.render_indicators(count);
        }
        self.show(visible, Motion::Instant);
        self.preload_around();
        self.autoscroll.start();
        info!(
            variant = %self.track.variant(),
            slides = self.track.slides().len(),
            start = visible,
            "carousel mounted"
        );
    }

    fn teardown(&mut self) {
        self.autoscroll.halt();
        self.snap = None;
        self.lazy_at = None;
        self.stage.clear();
        info!(variant = %self.track.variant(), "carousel torn down");
    }

    fn handle(&mut self, command: CarouselCommand) {
        trace!(?command, "carousel command");
        match command {
            CarouselCommand::Next => {
                let step = self.track.next();
                self.navigate(step, Origin::Manual);
                self.autoscroll.interact();
            }
            CarouselCommand::Prev => {
                let step = self.track.prev();
                self.navigate(step, Origin::Manual);
                self.autoscroll.interact();
            }
            CarouselCommand::GoTo(index) => {
                let step = self.track.go_to(index);
                self.navigate(step, Origin::Manual);
                self.autoscroll.interact();
            }
            CarouselCommand::TouchStart { x, y } => {
                self.swipe.begin(x, y);
                self.autoscroll.interact();
            }
            CarouselCommand::TouchMove { x, y } => {
                if self.swipe.movement(x, y) {
                    self.stage.suppress_scroll();
                }
            }
            CarouselCommand::TouchEnd { x, y, on_link } => {
                match self.swipe.release(x, y, on_link) {
                    Some(Swipe::Next) => {
                        let step = self.track.next();
                        self.navigate(step, Origin::Swipe);
                    }
                    Some(Swipe::Prev) => {
                        let step = self.track.prev();
                        self.navigate(step, Origin::Swipe);
                    }
                    None => {}
                }
                self.autoscroll.interact();
            }
            CarouselCommand::TouchCancel => self.swipe.cancel(),
            CarouselCommand::Relayout => self.show(self.track.index(), Motion::Instant),
        }
    }

    fn navigate(&mut self, step: Step, origin: Origin) {
        // A newer move always supersedes the snap of an older one.
        self.snap = None;
        if let Some(from) = step.jump {
            self.show(from, Motion::Instant);
        }
        self.show(step.index, Motion::Animated);
        if let Some(settle) = step.settle {
            self.snap = Some(PendingSnap {
                settle,
                at: Instant::now() + self.opts.transition,
            });
        }
        debug!(?origin, index = step.index, jump = ?step.jump, "carousel moved");
        self.preload_around();
    }

    fn on_snap(&mut self) {
        let Some(snap) = self.snap.take() else {
            return;
        };
        if self.track.settle(snap.settle) {
            self.show(snap.settle.to, Motion::Instant);
            debug!(from = snap.settle.from, to = snap.settle.to, "loop snap");
            self.preload_around();
        } else {
            debug!(?snap.settle, index = self.track.index(), "stale loop snap ignored");
        }
    }

    fn show(&mut self, index: usize, motion: Motion) {
        let offset = self.track.offset(
            index,
            self.stage.container_width(),
            self.opts.card_gap_px,
        );
        self.stage.set_offset(offset, motion);
        if self.track.indicator_count().is_some() {
            self.stage.set_active_indicator(index);
        }
    }

    /// Eagerly warm the visible slide and its neighbours, and push back the
    /// lazy pass over everything else.
    fn preload_around(&mut self) {
        for position in self.track.neighbours(self.track.index()) {
            self.stage.set_loading(position, LoadingHint::Eager);
            for slot in &self.track.slides()[position].images {
                self.preloader.preload(slot);
            }
        }
        self.lazy_at = Some(Instant::now() + self.opts.lazy_preload_delay);
    }

    fn warm_remaining(&mut self) {
        self.lazy_at = None;
        let mut started = 0usize;
        for slot in self.track.slides().iter().flat_map(|s| s.images.iter()) {
            if !slot.is_preloaded() && self.preloader.preload(slot).is_some() {
                started += 1;
            }
        }
        trace!(started, "lazy preload pass");
    }
}

/// Drive `engine` until cancelled or until every command sender is gone.
#[instrument(skip_all, fields(variant = %engine.track.variant()))]
pub async fn run<S: Stage, F: ImageFetcher>(
    mut engine: Engine<S, F>,
    mut commands: Receiver<CarouselCommand>,
    cancel: CancellationToken,
) -> Result<()> {
    engine.mount();
    loop {
        let snap_at = engine.snap.map(|s| s.at);
        let lazy_at = engine.lazy_at;
        select! {
            biased;

            _ = cancel.cancelled() => break,

            command = commands.recv() => match command {
                Some(command) => engine.handle(command),
                None => break,
            },

            _ = wait_until(snap_at) => engine.on_snap(),

            event = engine.autoscroll.wait() => {
                if event == AutoScrollEvent::Tick {
                    let step = engine.track.next();
                    engine.navigate(step, Origin::Auto);
                }
            }

            _ = wait_until(lazy_at) => engine.warm_remaining(),
        }
    }
    engine.teardown();
    Ok(())
}

/// Owner's side of a running engine.
#[derive(Debug)]
pub struct EngineHandle {
    variant: Variant,
    commands: Sender<CarouselCommand>,
    cancel: CancellationToken,
    task: JoinHandle<Result<()>>,
}

impl EngineHandle {
    /// Build an engine for `photos` and start it on the runtime.
    pub fn spawn<S: Stage, F: ImageFetcher>(
        variant: Variant,
        photos: &[Photo],
        stage: S,
        preloader: Preloader<F>,
        opts: CarouselOptions,
        cancel: CancellationToken,
    ) -> Result<Self, MountError> {
        let engine = Engine::new(variant, photos, stage, preloader, opts)?;
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
        let task = tokio::spawn(run(engine, rx, cancel.clone()));
        Ok(Self {
            variant,
            commands: tx,
            cancel,
            task,
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn commands(&self) -> Sender<CarouselCommand> {
        self.commands.clone()
    }

    /// Queue a command. Returns `false` if the engine is gone or saturated.
    pub fn send(&self, command: CarouselCommand) -> bool {
        self.commands.try_send(command).is_ok()
    }

    /// Queue a command, waiting for room. Returns `false` if the engine is gone.
    pub async fn deliver(&self, command: CarouselCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Cancel the engine and wait until it has cleared its stage.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        match self.task.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(variant = %self.variant, error = %err, "carousel exited with error"),
            Err(err) => warn!(variant = %self.variant, error = %err, "carousel task failed"),
        }
    }
}
