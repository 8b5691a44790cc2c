//! Snaps the scroll position to a row boundary once the user stops scrolling.
//!
//! [`snap_target`] is the pure decision. [`ScrollSnapEngine`] is the
//! `Idle → Scrolling → (debounce) → Snapping → Idle` state machine around it, driven by the
//! frame time so it needs no timer thread.

use std::time::Duration;

/// Tuning for scroll snapping. The defaults avoid visible jitter; none of them is load-bearing.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ScrollSnapConfig {
    /// How long scrolling must be quiet before snapping. Default: 300 ms.
    pub delay: Duration,

    /// Positions this close to the top or bottom count as being at the edge. Default: `3.0`.
    pub edge_epsilon: f32,

    /// Corrections this small are skipped. Default: `2.0`.
    pub min_movement: f32,

    /// Kept above the aligned row so its top border is not hidden under the header.
    /// Default: `1.0`.
    pub border_offset: f32,

    /// Length of the snapping animation. Default: 250 ms.
    pub animation_duration: Duration,
}

impl Default for ScrollSnapConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(300),
            edge_epsilon: 3.0,
            min_movement: 2.0,
            border_offset: 1.0,
            animation_duration: Duration::from_millis(250),
        }
    }
}

impl ScrollSnapConfig {
    #[inline]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[inline]
    pub fn edge_epsilon(mut self, edge_epsilon: f32) -> Self {
        self.edge_epsilon = edge_epsilon;
        self
    }

    #[inline]
    pub fn min_movement(mut self, min_movement: f32) -> Self {
        self.min_movement = min_movement;
        self
    }

    #[inline]
    pub fn border_offset(mut self, border_offset: f32) -> Self {
        self.border_offset = border_offset;
        self
    }

    #[inline]
    pub fn animation_duration(mut self, animation_duration: Duration) -> Self {
        self.animation_duration = animation_duration;
        self
    }
}

// ----------------------------------------------------------------------------

/// Vertical extent of one rendered row, in content coordinates.
///
/// Content coordinates include the header: the first body row starts at the header height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowSpan {
    pub top: f32,
    pub height: f32,
}

impl RowSpan {
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// The scroll container, measured when a scroll-stop is detected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollState {
    pub scroll_top: f32,
    pub container_height: f32,
    pub content_height: f32,
}

impl ScrollState {
    pub fn max_scroll_top(&self) -> f32 {
        (self.content_height - self.container_height).max(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SnapDecision {
    /// Already aligned, or at an edge.
    Stay,
    ScrollTo(f32),
}

/// Where to scroll so the row area below the header starts at a row's top edge.
///
/// `rows` are the rendered rows in order (expansion rows are rows too).
pub fn snap_target(
    config: &ScrollSnapConfig,
    header_height: f32,
    rows: &[RowSpan],
    scroll: &ScrollState,
) -> SnapDecision {
    let scroll_top = scroll.scroll_top;
    let max_scroll_top = scroll.max_scroll_top();

    if scroll_top <= config.edge_epsilon {
        // Always reveal the top completely.
        return if scroll_top > 0.0 {
            SnapDecision::ScrollTo(0.0)
        } else {
            SnapDecision::Stay
        };
    }
    if scroll_top >= max_scroll_top - config.edge_epsilon {
        return SnapDecision::Stay;
    }

    // First row reaching below the header line, within the viewport:
    let Some(index) = rows.iter().position(|row| {
        let top = row.top - scroll_top;
        top + row.height > header_height && top < scroll.container_height
    }) else {
        return SnapDecision::Stay;
    };

    let row = rows[index];
    let top_below_header = row.top - scroll_top - header_height;
    let visible_height = if top_below_header >= 0.0 {
        row.height
    } else {
        row.height + top_below_header
    };

    let aligned_top = if visible_height < row.height / 2.0 {
        rows.get(index + 1).map_or(row.top, |next| next.top)
    } else {
        row.top
    };

    let target = (aligned_top - header_height - config.border_offset).clamp(0.0, max_scroll_top);

    if (target - scroll_top).abs() > config.min_movement {
        SnapDecision::ScrollTo(target)
    } else {
        SnapDecision::Stay
    }
}

// ----------------------------------------------------------------------------

/// An in-flight smooth scroll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapAnimation {
    pub from: f32,
    pub to: f32,
    pub start_time: f64,
    pub duration: f32,
}

impl SnapAnimation {
    /// Offset at `time`, and whether the animation is over.
    pub fn offset_at(&self, time: f64) -> (f32, bool) {
        if self.duration <= 0.0 {
            return (self.to, true);
        }
        let t = ((time - self.start_time) as f32 / self.duration).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - t).powi(3);
        (egui::lerp(self.from..=self.to, eased), t >= 1.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SnapPhase {
    #[default]
    Idle,

    /// The user is scrolling; snapping is evaluated at `deadline` unless they scroll again.
    Scrolling { deadline: f64 },

    Snapping(SnapAnimation),
}

/// Scroll-snap state of one grid.
///
/// Per frame: apply [`Self::animated_offset`] to the scroll area, show it, report the
/// resulting offset to [`Self::observe`], then [`Self::poll`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollSnapEngine {
    phase: SnapPhase,

    /// Offset seen at the end of the previous frame.
    last_offset: Option<f32>,
}

impl ScrollSnapEngine {
    #[inline]
    pub fn phase(&self) -> SnapPhase {
        self.phase
    }

    /// Offset the scroll area must be forced to this frame, while snapping.
    pub fn animated_offset(&mut self, time: f64) -> Option<f32> {
        let SnapPhase::Snapping(animation) = self.phase else {
            return None;
        };
        let (offset, done) = animation.offset_at(time);
        if done {
            self.phase = SnapPhase::Idle;
        }
        Some(offset)
    }

    /// Report the offset the scroll area ended the frame at.
    ///
    /// `forced` is what [`Self::animated_offset`] returned this frame. Any other movement is
    /// the user scrolling: it restarts the debounce and cancels a running animation.
    pub fn observe(&mut self, offset: f32, forced: Option<f32>, time: f64, config: &ScrollSnapConfig) {
        if let Some(expected) = forced.or(self.last_offset)
            && (offset - expected).abs() > 0.5
        {
            self.on_scroll(time, config);
        }
        self.last_offset = Some(offset);
    }

    /// A scroll event: (re)start the debounce.
    pub fn on_scroll(&mut self, time: f64, config: &ScrollSnapConfig) {
        self.phase = SnapPhase::Scrolling {
            deadline: time + config.delay.as_secs_f64(),
        };
    }

    /// Fire the debounce if it is due. `decide` is only called then.
    ///
    /// Returns the snap target when an animation was started.
    pub fn poll(
        &mut self,
        time: f64,
        config: &ScrollSnapConfig,
        decide: impl FnOnce() -> SnapDecision,
    ) -> Option<f32> {
        let SnapPhase::Scrolling { deadline } = self.phase else {
            return None;
        };
        if time < deadline {
            return None;
        }
        match decide() {
            SnapDecision::Stay => {
                self.phase = SnapPhase::Idle;
                None
            }
            SnapDecision::ScrollTo(target) => {
                log::debug!("Snapping scroll offset to {target}");
                self.phase = SnapPhase::Snapping(SnapAnimation {
                    from: self.last_offset.unwrap_or(target),
                    to: target,
                    start_time: time,
                    duration: config.animation_duration.as_secs_f32(),
                });
                Some(target)
            }
        }
    }

    /// Drop any pending debounce and running animation.
    pub fn cancel(&mut self) {
        self.phase = SnapPhase::Idle;
        self.last_offset = None;
    }

    /// When the engine next needs a frame, if at all.
    pub fn next_wakeup(&self, time: f64) -> Option<Duration> {
        match self.phase {
            SnapPhase::Idle => None,
            SnapPhase::Scrolling { deadline } => {
                Some(Duration::from_secs_f64((deadline - time).max(0.0)))
            }
            SnapPhase::Snapping(_) => Some(Duration::ZERO),
        }
    }
}
