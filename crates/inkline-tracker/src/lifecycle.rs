use std::time::{Duration, Instant};

/// Where a suggestion got to before it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStatus {
    TriggeredNotDisplayed,
    Displayed,
    Hidden,
}

impl LifecycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::TriggeredNotDisplayed => "triggered_not_displayed",
            LifecycleStatus::Displayed => "displayed",
            LifecycleStatus::Hidden => "hidden",
        }
    }
}

/// Per-suggestion timing state: Triggered -> Displayed -> Hidden, each
/// transition stamped once with a monotonic timestamp. Created at trigger
/// time, replaced when the next suggestion for the session starts.
/// Performs no aggregation; derived values go to telemetry verbatim.
#[derive(Debug, Clone, Default)]
pub struct SuggestionLifecycle {
    triggered_at: Option<Instant>,
    displayed_at: Option<Instant>,
    hidden_at: Option<Instant>,
}

impl SuggestionLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp T0 when the request enters `Requesting`. Later calls are
    /// no-ops.
    pub fn mark_triggered(&mut self) {
        if self.triggered_at.is_none() {
            self.triggered_at = Some(Instant::now());
        }
    }

    /// Stamp T1 when the suggestion is actually drawn.
    pub fn mark_displayed(&mut self) {
        if self.displayed_at.is_none() {
            self.displayed_at = Some(Instant::now());
        }
    }

    /// Stamp T2 when the suggestion is cleared.
    pub fn mark_hidden(&mut self) {
        if self.hidden_at.is_none() {
            self.hidden_at = Some(Instant::now());
        }
    }

    /// T1 - T0.
    pub fn latency(&self) -> Option<Duration> {
        match (self.triggered_at, self.displayed_at) {
            (Some(t0), Some(t1)) => Some(t1.saturating_duration_since(t0)),
            _ => None,
        }
    }

    /// T2 - T1.
    pub fn display_duration(&self) -> Option<Duration> {
        match (self.displayed_at, self.hidden_at) {
            (Some(t1), Some(t2)) => Some(t2.saturating_duration_since(t1)),
            _ => None,
        }
    }

    /// Whether T0 was ever stamped. Cycles cancelled during debounce
    /// never reach it and produce no record.
    pub fn triggered(&self) -> bool {
        self.triggered_at.is_some()
    }

    pub fn status(&self) -> LifecycleStatus {
        if self.displayed_at.is_none() {
            LifecycleStatus::TriggeredNotDisplayed
        } else if self.hidden_at.is_none() {
            LifecycleStatus::Displayed
        } else {
            LifecycleStatus::Hidden
        }
    }
}
