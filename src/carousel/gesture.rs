/// Direction decided by a completed swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Next,
    Prev,
}

/// Turns touch start/move/end into at most one navigation.
///
/// With a deadzone, a touch only counts once its horizontal travel exceeds
/// the deadzone and dominates vertical travel; until then it is left to the
/// page as a scroll.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f32,
    deadzone: Option<f32>,
    start: Option<(f32, f32)>,
    claimed: bool,
}

impl SwipeTracker {
    pub fn new(threshold: f32, deadzone: Option<f32>) -> Self {
        Self {
            threshold,
            deadzone,
            start: None,
            claimed: false,
        }
    }

    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
        self.claimed = false;
    }

    /// Returns `true` exactly once, when the touch becomes a horizontal drag.
    pub fn movement(&mut self, x: f32, y: f32) -> bool {
        if self.claimed || self.deadzone.is_none() {
            return false;
        }
        if self.crosses_deadzone(x, y) {
            self.claimed = true;
            return true;
        }
        false
    }

    pub fn release(&mut self, x: f32, y: f32, on_link: bool) -> Option<Swipe> {
        let (sx, _) = self.start?;
        let horizontal = self.deadzone.is_none() || self.claimed || self.crosses_deadzone(x, y);
        self.cancel();
        if on_link || !horizontal {
            return None;
        }
        let travel = sx - x;
        if travel >= self.threshold {
            Some(Swipe::Next)
        } else if -travel >= self.threshold {
            Some(Swipe::Prev)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.start = None;
        self.claimed = false;
    }

    fn crosses_deadzone(&self, x: f32, y: f32) -> bool {
        match (self.start, self.deadzone) {
            (Some((sx, sy)), Some(deadzone)) => {
                let dx = (x - sx).abs();
                dx > deadzone && dx > (y - sy).abs()
            }
            _ => false,
        }
    }
}
