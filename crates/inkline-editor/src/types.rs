/// Byte range into a buffer. `start` and `end` must lie on character
/// boundaries of the buffer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// How a trigger cycle was started.
/// `Invoke` bypasses the mid-word validity guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Automatic,
    Invoke,
}

/// The host editor's indentation settings for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentConfig {
    pub use_tabs: bool,
    pub tab_size: usize,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            use_tabs: false,
            tab_size: 4,
        }
    }
}

/// One inline ghost-text anchor: `text` is drawn at `offset` without
/// replacing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    pub offset: usize,
    pub text: String,
}

/// The only artifact the editor overlay consumes. Inline spans cover the
/// candidate's first line; `block_text` holds everything after it, rendered
/// as one contiguous overlay below the trigger line.
///
/// A rendered suggestion never deletes or rewrites buffer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSuggestion {
    pub inline_spans: Vec<InlineSpan>,
    pub block_text: Option<String>,
}

impl RenderedSuggestion {
    pub fn is_empty(&self) -> bool {
        self.inline_spans.is_empty() && self.block_text.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_len() {
        assert_eq!(TextRange::new(3, 8).len(), 5);
        assert_eq!(TextRange::new(8, 3).len(), 0);
        assert!(TextRange::new(4, 4).is_empty());
    }

    #[test]
    fn test_rendered_suggestion_empty() {
        let s = RenderedSuggestion {
            inline_spans: vec![],
            block_text: None,
        };
        assert!(s.is_empty());

        let s = RenderedSuggestion {
            inline_spans: vec![],
            block_text: Some("fn foo() {}".to_string()),
        };
        assert!(!s.is_empty());
    }
}
