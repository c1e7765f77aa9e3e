//! Viewport/zoom controller.
//!
//! Watches chart extremes changes and decides when the visible window is
//! getting close enough to the edge of cached data that a wider range should
//! be prefetched.

use candela_core::{CandelaError, DataRange, SeriesKey, ViewportConfig, envelope};

use crate::core::Candela;
use crate::fetch::{ChartData, ChartQuery};

/// Widths within this many milliseconds of the previous width count as a pan.
pub const WIDTH_TOLERANCE_MS: i64 = 1;

/// What caused a viewport change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// The user changed the visible span (wheel, navigator, range buttons).
    UserZoom,
    /// The user moved the visible window without resizing it on purpose.
    UserPan,
    /// The application set the extremes itself.
    Programmatic,
}

impl Trigger {
    /// Map a chart library's trigger label onto a [`Trigger`].
    ///
    /// Unknown or missing labels are treated as programmatic so that extremes
    /// set by the application never feed back into fetching.
    #[must_use]
    pub fn from_chart_trigger(raw: &str) -> Self {
        match raw {
            "zoom" | "navigator" | "rangeSelectorButton" | "mousewheel" => Self::UserZoom,
            "pan" | "scrollbar" => Self::UserPan,
            _ => Self::Programmatic,
        }
    }

    /// True for user-initiated changes.
    #[must_use]
    pub const fn is_user(self) -> bool {
        matches!(self, Self::UserZoom | Self::UserPan)
    }
}

/// One viewport change reported by the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportEvent {
    /// Left edge of the visible window (ms).
    pub min: i64,
    /// Right edge of the visible window (ms).
    pub max: i64,
    /// Origin of the change.
    pub trigger: Trigger,
}

impl ViewportEvent {
    /// Build an event; swapped edges are reordered.
    #[must_use]
    pub const fn new(min: i64, max: i64, trigger: Trigger) -> Self {
        let r = DataRange::ordered(min, max);
        Self {
            min: r.from,
            max: r.to,
            trigger,
        }
    }

    /// Visible width in milliseconds.
    #[must_use]
    pub const fn width(&self) -> i64 {
        self.max - self.min
    }
}

/// How the visible window changed relative to the previous event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    /// Narrower window.
    ZoomIn,
    /// Wider window.
    ZoomOut,
    /// Same width, shifted.
    Pan,
}

/// Outcome of [`ViewportController::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportDecision {
    /// Programmatic change, or a fetch is already running for the series.
    Ignored,
    /// First event of the session; only the width was recorded.
    Recorded,
    /// The cached data comfortably covers the window.
    Hold(Motion),
    /// Fetch this range to stay ahead of the viewport.
    Expand(DataRange),
}

/// Per-series prefetch state machine.
///
/// Behavior and trade-offs:
/// - Zooming in never triggers a fetch; a narrower window only reveals data
///   that is already loaded.
/// - On zoom-out or pan, expansion starts once the window comes within
///   `prefetch_ratio` of the cached span from either edge. The default of half
///   the span prefetches aggressively, trading payload size for never showing
///   an empty region.
/// - The requested range extends `expansion_factor` viewport widths beyond
///   each side of the current window, not of the cached span.
#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    cfg: ViewportConfig,
    previous_width: Option<i64>,
}

impl ViewportController {
    /// Create a controller with the given tunables.
    #[must_use]
    pub const fn new(cfg: ViewportConfig) -> Self {
        Self {
            cfg,
            previous_width: None,
        }
    }

    /// Width recorded from the last accepted event.
    #[must_use]
    pub const fn previous_width(&self) -> Option<i64> {
        self.previous_width
    }

    /// Forget the recorded width, e.g. after switching series.
    pub const fn reset(&mut self) {
        self.previous_width = None;
    }

    /// Classify `event` and decide whether the series needs more data.
    pub fn observe(
        &mut self,
        event: &ViewportEvent,
        loaded: &[DataRange],
        fetch_in_flight: bool,
    ) -> ViewportDecision {
        if !event.trigger.is_user() || fetch_in_flight {
            return ViewportDecision::Ignored;
        }

        let width = event.width();
        let Some(previous) = self.previous_width.replace(width) else {
            return ViewportDecision::Recorded;
        };

        let motion = if previous - width > WIDTH_TOLERANCE_MS {
            Motion::ZoomIn
        } else if width - previous > WIDTH_TOLERANCE_MS {
            Motion::ZoomOut
        } else {
            Motion::Pan
        };
        if motion == Motion::ZoomIn {
            return ViewportDecision::Hold(motion);
        }

        if self.near_edge(event, loaded) {
            ViewportDecision::Expand(self.expansion_target(event))
        } else {
            ViewportDecision::Hold(motion)
        }
    }

    fn near_edge(&self, event: &ViewportEvent, loaded: &[DataRange]) -> bool {
        let Some(cached) = envelope(loaded) else {
            return true;
        };
        #[allow(clippy::cast_precision_loss)]
        let buffer = cached.width() as f64 * self.cfg.prefetch_ratio;
        #[allow(clippy::cast_precision_loss)]
        let (view_min, view_max, cached_min, cached_max) = (
            event.min as f64,
            event.max as f64,
            cached.from as f64,
            cached.to as f64,
        );
        view_min < cached_min + buffer || view_max > cached_max - buffer
    }

    fn expansion_target(&self, event: &ViewportEvent) -> DataRange {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let margin = (event.width() as f64 * self.cfg.expansion_factor).round() as i64;
        DataRange::ordered(
            event.min.saturating_sub(margin),
            event.max.saturating_add(margin),
        )
    }
}

/// Result of [`Candela::on_viewport_change`].
#[derive(Debug, Clone)]
pub struct ViewportOutcome {
    /// What the controller decided.
    pub decision: ViewportDecision,
    /// Data produced by the expansion load, when one ran.
    pub data: Option<ChartData>,
}

impl Candela {
    /// Feed a chart viewport change through `controller` and, when it asks
    /// for expansion, load the expansion window.
    ///
    /// The controller sees this series' loaded ranges and whether a network
    /// request for it is already outstanding.
    ///
    /// # Errors
    /// Propagates errors from the expansion load.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "candela::viewport",
            skip(self, controller, event),
            fields(series = %series, min = event.min, max = event.max),
        )
    )]
    pub async fn on_viewport_change(
        &self,
        series: &SeriesKey,
        controller: &mut ViewportController,
        event: &ViewportEvent,
    ) -> Result<ViewportOutcome, CandelaError> {
        let loaded = self.loaded_ranges(series).await;
        let in_flight = self.series.is_fetching(series);
        let decision = controller.observe(event, &loaded, in_flight);

        let data = match decision {
            ViewportDecision::Expand(target) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "candela::viewport", range = %target, "expanding cached range");
                let query = ChartQuery::new(series.clone()).with_expansion(target);
                Some(self.load(&query).await?)
            }
            _ => None,
        };
        Ok(ViewportOutcome { decision, data })
    }
}
