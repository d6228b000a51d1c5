use inkline_editor::TextRange;

/// One completion returned by a provider. Immutable once built;
/// post-processing produces new candidates rather than editing in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub insert_text: String,
    /// Buffer range the insert text maps onto: starts at the trigger
    /// offset and covers the rest of the cursor's line.
    pub range: TextRange,
    pub stop_reason: String,
}

impl CompletionCandidate {
    pub fn new(insert_text: String, range: TextRange, stop_reason: String) -> Self {
        Self {
            insert_text,
            range,
            stop_reason,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.insert_text.is_empty()
    }

    /// The candidate's first line, the part reconciled against the
    /// buffer by the diff merger.
    pub fn first_line(&self) -> &str {
        match self.insert_text.find('\n') {
            Some(nl) => &self.insert_text[..nl],
            None => &self.insert_text,
        }
    }

    /// Everything after the first line, if any.
    pub fn remaining_lines(&self) -> Option<&str> {
        self.insert_text.find('\n').map(|nl| &self.insert_text[nl + 1..])
    }
}
