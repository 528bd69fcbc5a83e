//! Mobile index arithmetic: one photo per card, modulo wrap, no clones.

use crate::carousel::track::Step;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTrack {
    count: usize,
    index: usize,
}

impl CardTrack {
    pub fn new(count: usize) -> Option<Self> {
        (count > 0).then_some(Self { count, index: 0 })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) -> Step {
        self.go_to(self.index + 1)
    }

    pub fn prev(&mut self) -> Step {
        self.go_to(self.index + self.count - 1)
    }

    pub fn go_to(&mut self, index: usize) -> Step {
        self.index = index % self.count;
        Step {
            jump: None,
            index: self.index,
            settle: None,
        }
    }

    /// The card and its wrapped neighbours, without duplicates.
    pub fn neighbours(&self, index: usize) -> Vec<usize> {
        let mut out = vec![
            (index + self.count - 1) % self.count,
            index,
            (index + 1) % self.count,
        ];
        out.sort_unstable();
        out.dedup();
        out
    }
}
