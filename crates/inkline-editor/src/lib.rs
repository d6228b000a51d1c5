pub mod event;
pub mod host;
pub mod types;

pub use event::EditorEvent;
pub use host::EditorHost;
pub use types::{IndentConfig, InlineSpan, RenderedSuggestion, TextRange, TriggerKind};
