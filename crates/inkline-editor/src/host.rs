use crate::types::{IndentConfig, RenderedSuggestion};

/// Boundary to the host editor. One implementation per embedding.
///
/// Accessors read the live buffer and caret for a session. Overlay
/// mutations (`render_suggestion`, `clear_suggestion`) must be applied on
/// the editor's UI-affinity thread; implementations are responsible for
/// marshaling there. The pipeline calls them from worker tasks.
pub trait EditorHost: Send + Sync {
    fn buffer_text(&self, session_id: &str) -> String;

    fn cursor_offset(&self, session_id: &str) -> usize;

    fn indent_config(&self, session_id: &str) -> IndentConfig;

    /// The line separator the buffer uses ("\n" or "\r\n").
    fn line_separator(&self, session_id: &str) -> String;

    fn render_suggestion(&self, session_id: &str, suggestion: &RenderedSuggestion);

    fn clear_suggestion(&self, session_id: &str);
}
