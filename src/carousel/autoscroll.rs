use std::future::pending;
use std::time::Duration;

use tokio::select;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until};

/// What [`AutoScroll::wait`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoScrollEvent {
    /// Time to advance one slide.
    Tick,
    /// The post-interaction quiet period ended and ticking restarted.
    Resumed,
}

/// Repeating advance timer with a pause-then-resume on interaction.
///
/// At most one interval exists at a time, and at most one pending resume.
#[derive(Debug)]
pub struct AutoScroll {
    period: Duration,
    resume_delay: Duration,
    ticker: Option<Interval>,
    resume_at: Option<Instant>,
}

impl AutoScroll {
    pub fn new(period: Duration, resume_delay: Duration) -> Self {
        Self {
            period,
            resume_delay,
            ticker: None,
            resume_at: None,
        }
    }

    /// Start ticking. Returns `false` if already running.
    pub fn start(&mut self) -> bool {
        if self.ticker.is_some() {
            return false;
        }
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);
        true
    }

    pub fn stop(&mut self) {
        self.ticker = None;
    }

    /// Stop ticking and restart after the resume delay, replacing any pending resume.
    pub fn interact(&mut self) {
        self.stop();
        self.resume_at = Some(Instant::now() + self.resume_delay);
    }

    /// Stop ticking and forget any pending resume.
    pub fn halt(&mut self) {
        self.stop();
        self.resume_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn resume_at(&self) -> Option<Instant> {
        self.resume_at
    }

    /// Wait for the next tick or resume. Pends forever while idle.
    pub async fn wait(&mut self) -> AutoScrollEvent {
        let resume_at = self.resume_at;
        select! {
            _ = next_tick(self.ticker.as_mut()) => AutoScrollEvent::Tick,
            _ = wait_until(resume_at) => {
                self.resume_at = None;
                self.start();
                AutoScrollEvent::Resumed
            }
        }
    }
}

async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}

/// Sleep until `deadline`, or forever when there is none.
pub async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => pending().await,
    }
}
