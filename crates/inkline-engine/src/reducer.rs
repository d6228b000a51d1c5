use inkline_editor::{EditorEvent, TriggerKind};

/// Per-session trigger state. At most one non-terminal request exists per
/// session; starting a new cycle always cancels the previous one first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Debouncing,
    Requesting,
    Rendering,
}

/// Side effects the coordinator applies after a state transition, in
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Cancel the in-flight request's scope.
    CancelCurrent,
    /// Clear the session's overlay and close out its lifecycle.
    ClearOverlay,
    /// Start a new debounced cycle.
    BeginCycle(TriggerKind),
}

/// Pure event reducer for the trigger state machine. The coordinator owns
/// the actual cancellation, overlay and scheduling; this function only
/// decides what happens, which keeps supersede logic testable without a
/// live editor.
pub fn reduce(phase: Phase, event: &EditorEvent) -> (Phase, Vec<Effect>) {
    match event {
        EditorEvent::CaretMoved { .. }
        | EditorEvent::SelectionChanged { .. }
        | EditorEvent::BufferEdited { .. } => begin(phase, TriggerKind::Automatic),
        EditorEvent::CompletionInvoked { .. } => begin(phase, TriggerKind::Invoke),
        EditorEvent::FocusChanged { focused: false, .. } => {
            let mut effects = Vec::new();
            if phase != Phase::Idle {
                effects.push(Effect::CancelCurrent);
            }
            if phase == Phase::Rendering {
                effects.push(Effect::ClearOverlay);
            }
            (Phase::Idle, effects)
        }
        EditorEvent::FocusChanged { focused: true, .. } => (phase, Vec::new()),
    }
}

fn begin(phase: Phase, kind: TriggerKind) -> (Phase, Vec<Effect>) {
    let mut effects = Vec::new();
    if phase != Phase::Idle {
        effects.push(Effect::CancelCurrent);
    }
    if phase == Phase::Rendering {
        effects.push(Effect::ClearOverlay);
    }
    effects.push(Effect::BeginCycle(kind));
    (Phase::Debouncing, effects)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caret(offset: usize) -> EditorEvent {
        EditorEvent::CaretMoved {
            session_id: "s1".to_string(),
            offset,
        }
    }

    #[test]
    fn test_idle_event_starts_cycle() {
        let (phase, effects) = reduce(Phase::Idle, &caret(5));
        assert_eq!(phase, Phase::Debouncing);
        assert_eq!(effects, vec![Effect::BeginCycle(TriggerKind::Automatic)]);
    }

    #[test]
    fn test_supersede_cancels_previous() {
        for from in [Phase::Debouncing, Phase::Requesting] {
            let (phase, effects) = reduce(from, &caret(5));
            assert_eq!(phase, Phase::Debouncing);
            assert_eq!(
                effects,
                vec![
                    Effect::CancelCurrent,
                    Effect::BeginCycle(TriggerKind::Automatic)
                ]
            );
        }
    }

    #[test]
    fn test_supersede_while_rendering_clears_overlay_first() {
        let (phase, effects) = reduce(Phase::Rendering, &caret(5));
        assert_eq!(phase, Phase::Debouncing);
        assert_eq!(
            effects,
            vec![
                Effect::CancelCurrent,
                Effect::ClearOverlay,
                Effect::BeginCycle(TriggerKind::Automatic)
            ]
        );
    }

    #[test]
    fn test_invoke_carries_trigger_kind() {
        let event = EditorEvent::CompletionInvoked {
            session_id: "s1".to_string(),
            offset: 3,
        };
        let (_, effects) = reduce(Phase::Idle, &event);
        assert_eq!(effects, vec![Effect::BeginCycle(TriggerKind::Invoke)]);
    }

    #[test]
    fn test_focus_lost_goes_idle() {
        let event = EditorEvent::FocusChanged {
            session_id: "s1".to_string(),
            focused: false,
        };
        let (phase, effects) = reduce(Phase::Rendering, &event);
        assert_eq!(phase, Phase::Idle);
        assert_eq!(effects, vec![Effect::CancelCurrent, Effect::ClearOverlay]);

        let (phase, effects) = reduce(Phase::Idle, &event);
        assert_eq!(phase, Phase::Idle);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_focus_gained_is_a_no_op() {
        let event = EditorEvent::FocusChanged {
            session_id: "s1".to_string(),
            focused: true,
        };
        let (phase, effects) = reduce(Phase::Requesting, &event);
        assert_eq!(phase, Phase::Requesting);
        assert!(effects.is_empty());
    }
}
