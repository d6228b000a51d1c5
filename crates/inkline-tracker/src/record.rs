use crate::lifecycle::SuggestionLifecycle;
use serde::{Deserialize, Serialize};

/// One finished suggestion, handed verbatim to the telemetry collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub session_id: String,
    pub request_id: String,
    /// Trigger-to-display, if the suggestion was ever drawn.
    pub latency_ms: Option<u64>,
    /// Display-to-clear, if the suggestion was drawn and then cleared.
    pub display_duration_ms: Option<u64>,
    pub status: String,
    /// True when the user accepted the suggestion rather than dismissing
    /// or typing past it.
    pub accepted: bool,
    /// Epoch millis when the record was created.
    pub recorded_at: u64,
}

impl SuggestionRecord {
    pub fn from_lifecycle(
        session_id: &str,
        request_id: &str,
        lifecycle: &SuggestionLifecycle,
        accepted: bool,
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            request_id: request_id.to_string(),
            latency_ms: lifecycle.latency().map(|d| d.as_millis() as u64),
            display_duration_ms: lifecycle.display_duration().map(|d| d.as_millis() as u64),
            status: lifecycle.status().as_str().to_string(),
            accepted,
            recorded_at: chrono::Utc::now().timestamp_millis() as u64,
        }
    }
}

/// Boundary to the external telemetry transport. The pipeline only hands
/// records over; batching and delivery live elsewhere.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, record: SuggestionRecord);
}

/// Default sink: drop everything.
pub struct NullTelemetry;

impl TelemetrySink for NullTelemetry {
    fn record(&self, _record: SuggestionRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_fresh_lifecycle() {
        let lc = SuggestionLifecycle::new();
        let rec = SuggestionRecord::from_lifecycle("s1", "r1", &lc, false);
        assert_eq!(rec.session_id, "s1");
        assert_eq!(rec.status, "triggered_not_displayed");
        assert!(rec.latency_ms.is_none());
        assert!(rec.display_duration_ms.is_none());
        assert!(!rec.accepted);
        assert!(rec.recorded_at > 0);
    }

    #[test]
    fn test_record_from_displayed_lifecycle() {
        let mut lc = SuggestionLifecycle::new();
        lc.mark_triggered();
        lc.mark_displayed();
        lc.mark_hidden();
        let rec = SuggestionRecord::from_lifecycle("s1", "r1", &lc, true);
        assert_eq!(rec.status, "hidden");
        assert!(rec.latency_ms.is_some());
        assert!(rec.display_duration_ms.is_some());
        assert!(rec.accepted);
    }

    #[test]
    fn test_record_serializes() {
        let lc = SuggestionLifecycle::new();
        let rec = SuggestionRecord::from_lifecycle("s1", "r1", &lc, false);
        let json = serde_json::to_string(&rec);
        assert!(json.is_ok());
    }
}
