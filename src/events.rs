/// Input delivered to a mounted carousel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarouselCommand {
    /// Next button.
    Next,
    /// Previous button.
    Prev,
    /// Indicator click.
    GoTo(usize),
    TouchStart { x: f32, y: f32 },
    TouchMove { x: f32, y: f32 },
    /// `on_link` is set when the touch ended on a link inside a slide.
    TouchEnd { x: f32, y: f32, on_link: bool },
    TouchCancel,
    /// Container size changed without a variant change.
    Relayout,
}

/// Why the carousel moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Manual,
    Swipe,
    Auto,
}

/// Media-query inputs for choosing a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSignals {
    pub width_px: u32,
    pub coarse_pointer: bool,
}
