pub mod lifecycle;
pub mod record;

pub use lifecycle::{LifecycleStatus, SuggestionLifecycle};
pub use record::{NullTelemetry, SuggestionRecord, TelemetrySink};
