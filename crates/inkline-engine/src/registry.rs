use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use inkline_common::CancellationScope;
use inkline_editor::TextRange;
use inkline_tracker::SuggestionLifecycle;

use crate::reducer::Phase;

/// Mutable per-session state guarded by the slot mutex.
#[derive(Default)]
pub struct SlotState {
    pub phase: Phase,
    pub scope: Option<CancellationScope>,
    pub lifecycle: Option<SuggestionLifecycle>,
    pub request_id: Option<String>,
    /// Insertion text of the currently rendered suggestion, returned to
    /// the host on accept.
    pub applied_text: Option<String>,
    /// Buffer range the insertion text replaces on accept.
    pub applied_range: Option<TextRange>,
    pub rendered: bool,
}

impl SlotState {
    /// Drops the cycle's request bookkeeping, back to a blank slot.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.scope = None;
        self.lifecycle = None;
        self.request_id = None;
        self.applied_text = None;
        self.applied_range = None;
        self.rendered = false;
    }
}

/// One editor session's slot. The generation counter is bumped every time
/// a new cycle starts; spawned cycles re-check it before every slot write
/// so a superseded task can never clobber its successor's state.
pub struct SessionSlot {
    session_id: String,
    generation: AtomicU64,
    pub state: Mutex<SlotState>,
}

impl SessionSlot {
    fn new(session_id: String) -> Self {
        Self {
            session_id,
            generation: AtomicU64::new(0),
            state: Mutex::new(SlotState::default()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Marks any previously spawned cycle stale and returns the new
    /// generation.
    pub fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// All live sessions, keyed by the host's session id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SessionSlot>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `session_id`, creating it on first use.
    pub async fn slot(&self, session_id: &str) -> Arc<SessionSlot> {
        {
            let sessions = self.sessions.read().await;
            if let Some(slot) = sessions.get(session_id) {
                return slot.clone();
            }
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(SessionSlot::new(session_id.to_string())))
            .clone()
    }

    pub async fn remove(&self, session_id: &str) -> Option<Arc<SessionSlot>> {
        self.sessions.write().await.remove(session_id)
    }
}
