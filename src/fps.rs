//! Frame rate measurement.
//!
//! [`FrameRateMeter`] samples the wall clock once per painted frame and
//! publishes a one-line summary to a [`StatusSink`].

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt,
    rc::Rc,
};

/// Smallest elapsed time a sample may have. Frames reported closer together
/// than this (or with a clock that went backwards) are clamped to it.
pub const MIN_FRAME_ELAPSED_MS: f64 = 1e-3;

/// Number of recent samples retained for inspection.
pub const DEFAULT_HISTORY_CAPACITY: usize = 600;

/// A millisecond wall clock.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// The host's clock: `performance.now()` in the browser, falling back to
/// `Date.now()` where no performance timer exists, and a monotonic instant
/// elsewhere.
pub struct SystemClock {
    #[cfg(target_arch = "wasm32")]
    performance: Option<web_sys::Performance>,
    #[cfg(not(target_arch = "wasm32"))]
    origin: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(target_arch = "wasm32")]
            performance: web_sys::window().and_then(|w| w.performance()),
            #[cfg(not(target_arch = "wasm32"))]
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> f64 {
        match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Where the meter writes its status line.
pub trait StatusSink {
    fn show(&mut self, text: &str);
}

impl StatusSink for web_sys::Element {
    fn show(&mut self, text: &str) {
        self.set_text_content(Some(text));
    }
}

impl StatusSink for Rc<RefCell<String>> {
    fn show(&mut self, text: &str) {
        let mut buf = self.borrow_mut();
        buf.clear();
        buf.push_str(text);
    }
}

/// Emits the status line through the `log` facade.
pub struct LogSink;

impl StatusSink for LogSink {
    fn show(&mut self, text: &str) {
        log::debug!("{text}");
    }
}

/// Every sample recorded since construction, summarized.
///
/// Minimum, maximum and mean cover the whole session and are kept as running
/// aggregates. Only the most recent `capacity` samples are retained as values,
/// so memory stays constant however long the session runs.
#[derive(Clone, Debug)]
pub struct FrameHistory {
    recent: VecDeque<f64>,
    capacity: usize,
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl FrameHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(capacity),
            capacity,
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn push(&mut self, fps: f64) {
        if self.capacity > 0 {
            if self.recent.len() == self.capacity {
                self.recent.pop_front();
            }
            self.recent.push_back(fps);
        }
        self.count += 1;
        self.sum += fps;
        self.min = self.min.min(fps);
        self.max = self.max.max(fps);
    }

    /// Total samples recorded, including those no longer retained.
    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn min(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.max)
    }

    pub fn mean(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.sum / self.count as f64)
    }

    /// Mean of the retained samples only: the recent frame rate, as opposed
    /// to the session-wide [`mean`](Self::mean).
    pub fn recent_mean(&self) -> Option<f64> {
        if self.recent.is_empty() {
            return None;
        }
        Some(self.recent.iter().sum::<f64>() / self.recent.len() as f64)
    }

    /// Retained samples, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = f64> + '_ {
        self.recent.iter().copied()
    }

    pub fn clear(&mut self) {
        *self = Self::with_capacity(self.capacity);
    }
}

impl Default for FrameHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

/// One computed summary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Mean over the retained window of recent samples.
    pub recent_avg: f64,
    pub samples: u64,
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FPS: {:.2} (min: {:.2}, max: {:.2}, avg: {:.2})",
            self.current, self.min, self.max, self.avg
        )
    }
}

pub struct FrameRateMeter {
    clock: Box<dyn Clock>,
    target: Box<dyn StatusSink>,
    last_ms: f64,
    history: FrameHistory,
    latest: Option<FrameStats>,
}

impl FrameRateMeter {
    pub fn new(clock: impl Clock + 'static, target: impl StatusSink + 'static) -> Self {
        Self::with_history(clock, target, FrameHistory::default())
    }

    pub fn with_history(
        clock: impl Clock + 'static,
        target: impl StatusSink + 'static,
        history: FrameHistory,
    ) -> Self {
        let last_ms = clock.now_ms();
        Self {
            clock: Box::new(clock),
            target: Box::new(target),
            last_ms,
            history,
            latest: None,
        }
    }

    /// Sample the clock, record the frame and publish the summary.
    pub fn render(&mut self) -> FrameStats {
        let now = self.clock.now_ms();
        let elapsed = (now - self.last_ms).max(MIN_FRAME_ELAPSED_MS);
        self.last_ms = now;

        let fps = 1000.0 / elapsed;
        self.history.push(fps);

        let stats = FrameStats {
            current: fps,
            min: self.history.min().unwrap_or(fps),
            max: self.history.max().unwrap_or(fps),
            avg: self.history.mean().unwrap_or(fps),
            recent_avg: self.history.recent_mean().unwrap_or(fps),
            samples: self.history.len(),
        };
        self.target.show(&stats.to_string());
        self.latest = Some(stats);
        stats
    }

    /// The summary from the most recent [`render`](Self::render).
    pub fn stats(&self) -> Option<FrameStats> {
        self.latest
    }

    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    /// Forget all samples and restart timing from now.
    pub fn reset(&mut self) {
        self.history.clear();
        self.latest = None;
        self.last_ms = self.clock.now_ms();
    }

    /// Restart timing from now without discarding samples, so an idle gap
    /// is not recorded as one slow frame.
    pub fn restart_timing(&mut self) {
        self.last_ms = self.clock.now_ms();
    }
}
