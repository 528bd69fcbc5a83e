//! Desktop index arithmetic with loop clones.
//!
//! The strip holds `[clone(last), g1 … gN, clone(g1)]`, so index `0` and
//! index `N + 1` show the same pictures as `N` and `1`. Moving onto a clone
//! is animated and then settled back onto the real group without
//! animation.

use crate::carousel::track::{Settle, Step};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrioTrack {
    real: usize,
    index: usize,
}

impl TrioTrack {
    /// Track over `real` groups, starting on the first real one.
    pub fn new(real: usize) -> Option<Self> {
        (real > 0).then_some(Self { real, index: 1 })
    }

    pub fn real_groups(&self) -> usize {
        self.real
    }

    /// Real groups plus both clones.
    pub fn slide_count(&self) -> usize {
        self.real + 2
    }

    pub fn index(&self) -> usize {
        self.index
    }

    fn trailing_clone(&self) -> usize {
        self.real + 1
    }

    pub fn next(&mut self) -> Step {
        let mut jump = None;
        if self.index == self.trailing_clone() {
            self.index = 1;
            jump = Some(self.index);
        }
        self.index += 1;
        let settle = (self.index == self.trailing_clone()).then_some(Settle {
            from: self.index,
            to: 1,
        });
        Step {
            jump,
            index: self.index,
            settle,
        }
    }

    pub fn prev(&mut self) -> Step {
        let mut jump = None;
        if self.index == 0 {
            self.index = self.real;
            jump = Some(self.index);
        }
        self.index -= 1;
        let settle = (self.index == 0).then_some(Settle {
            from: 0,
            to: self.real,
        });
        Step {
            jump,
            index: self.index,
            settle,
        }
    }

    /// Show real group `group` (zero-based, wrapped).
    pub fn go_to(&mut self, group: usize) -> Step {
        self.index = group % self.real + 1;
        Step {
            jump: None,
            index: self.index,
            settle: None,
        }
    }

    /// Apply a scheduled snap if the track still sits where it was scheduled.
    pub fn settle(&mut self, settle: Settle) -> bool {
        if self.index != settle.from {
            return false;
        }
        self.index = settle.to;
        true
    }

    /// Slide positions that should load eagerly around `index`.
    pub fn neighbours(&self, index: usize) -> Vec<usize> {
        let last = self.slide_count() - 1;
        (index.saturating_sub(1)..=(index + 1).min(last)).collect()
    }
}
