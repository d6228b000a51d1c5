/// Events fed from the host editor's subscription feed.
/// Offsets are byte offsets into the session buffer at event time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    CaretMoved {
        session_id: String,
        offset: usize,
    },
    SelectionChanged {
        session_id: String,
        offset: usize,
    },
    BufferEdited {
        session_id: String,
        offset: usize,
    },
    FocusChanged {
        session_id: String,
        focused: bool,
    },
    /// Explicit user command ("trigger completion now").
    CompletionInvoked {
        session_id: String,
        offset: usize,
    },
}

impl EditorEvent {
    pub fn session_id(&self) -> &str {
        match self {
            EditorEvent::CaretMoved { session_id, .. }
            | EditorEvent::SelectionChanged { session_id, .. }
            | EditorEvent::BufferEdited { session_id, .. }
            | EditorEvent::FocusChanged { session_id, .. }
            | EditorEvent::CompletionInvoked { session_id, .. } => session_id,
        }
    }

    /// Cursor offset carried by the event, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            EditorEvent::CaretMoved { offset, .. }
            | EditorEvent::SelectionChanged { offset, .. }
            | EditorEvent::BufferEdited { offset, .. }
            | EditorEvent::CompletionInvoked { offset, .. } => Some(*offset),
            EditorEvent::FocusChanged { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_accessor() {
        let e = EditorEvent::CaretMoved {
            session_id: "s1".to_string(),
            offset: 10,
        };
        assert_eq!(e.session_id(), "s1");
        assert_eq!(e.offset(), Some(10));
    }

    #[test]
    fn test_focus_event_has_no_offset() {
        let e = EditorEvent::FocusChanged {
            session_id: "s1".to_string(),
            focused: false,
        };
        assert_eq!(e.offset(), None);
    }
}
