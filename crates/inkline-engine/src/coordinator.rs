use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};
use uuid::Uuid;

use inkline_common::config::{CompletionConfig, ConfigSource};
use inkline_common::CancellationScope;
use inkline_context::{clamp_offset, current_line_suffix, extract, trigger_verdict};
use inkline_editor::{EditorEvent, EditorHost, TextRange, TriggerKind};
use inkline_llm::{BackendFactory, CompletionBackend, CompletionResult};
use inkline_prompt::{assemble, CompletionRequest, ProviderStrategy, SnippetSource};
use inkline_suggest::{merge, post_process, CompletionCandidate};
use inkline_tracker::{SuggestionLifecycle, SuggestionRecord, TelemetrySink};

use crate::reducer::{reduce, Effect, Phase};
use crate::registry::{SessionRegistry, SessionSlot, SlotState};

/// Drives the whole suggestion pipeline: consumes editor events, runs at
/// most one debounced cycle per session, and owns the overlay and
/// telemetry handoff.
///
/// Configuration is re-read from the source at the start of every cycle,
/// so edits to the config file apply on the next trigger without a
/// restart. The one exception is the remote-call limiter, whose bound is
/// fixed at construction.
pub struct Coordinator {
    host: Arc<dyn EditorHost>,
    config: Arc<dyn ConfigSource>,
    backends: Arc<dyn BackendFactory>,
    snippets: Arc<dyn SnippetSource>,
    telemetry: Arc<dyn TelemetrySink>,
    registry: SessionRegistry,
    /// Caps concurrent remote calls across all sessions.
    limiter: Arc<Semaphore>,
    /// The provider-misconfiguration warning is surfaced once per run,
    /// then demoted to debug.
    provider_hint_shown: AtomicBool,
}

impl Coordinator {
    pub fn new(
        host: Arc<dyn EditorHost>,
        config: Arc<dyn ConfigSource>,
        backends: Arc<dyn BackendFactory>,
        snippets: Arc<dyn SnippetSource>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        let bound = config
            .load()
            .map(|c| c.max_concurrent_requests)
            .unwrap_or_else(|_| CompletionConfig::default().max_concurrent_requests)
            .max(1);
        Self {
            host,
            config,
            backends,
            snippets,
            telemetry,
            registry: SessionRegistry::new(),
            limiter: Arc::new(Semaphore::new(bound)),
            provider_hint_shown: AtomicBool::new(false),
        }
    }

    /// Feed one editor event through the state machine. Serialized per
    /// session by the slot mutex.
    pub async fn handle_event(self: &Arc<Self>, event: EditorEvent) {
        let slot = self.registry.slot(event.session_id()).await;
        let mut state = slot.state.lock().await;
        let (next_phase, effects) = reduce(state.phase, &event);

        for effect in effects {
            match effect {
                Effect::CancelCurrent => {
                    if let Some(scope) = state.scope.take() {
                        scope.cancel();
                    }
                }
                Effect::ClearOverlay => {
                    if state.rendered {
                        self.host.clear_suggestion(slot.session_id());
                        state.rendered = false;
                    }
                }
                Effect::BeginCycle(kind) => {
                    self.close_out(&slot, &mut state, false);
                    let generation = slot.bump_generation();
                    let scope = CancellationScope::new();
                    state.scope = Some(scope.clone());
                    state.lifecycle = Some(SuggestionLifecycle::new());
                    state.request_id = Some(Uuid::new_v4().to_string());
                    state.phase = Phase::Debouncing;
                    let this = self.clone();
                    let task_slot = slot.clone();
                    tokio::spawn(async move {
                        this.run_cycle(task_slot, generation, scope, kind).await;
                    });
                }
            }
        }

        if next_phase == Phase::Idle && state.phase != Phase::Idle {
            self.close_out(&slot, &mut state, false);
        }
    }

    /// Current phase of a session's slot, for hosts that surface it.
    pub async fn phase(&self, session_id: &str) -> Phase {
        let slot = self.registry.slot(session_id).await;
        let state = slot.state.lock().await;
        state.phase
    }

    /// Accept the rendered suggestion. Returns the insertion text and
    /// the buffer range it replaces; the host splices the text over the
    /// range (the candidate's text subsumes whatever the range held, it
    /// is not appended after it). `None` when nothing is rendered.
    pub async fn accept(&self, session_id: &str) -> Option<(String, TextRange)> {
        let slot = self.registry.slot(session_id).await;
        let mut state = slot.state.lock().await;
        if state.phase != Phase::Rendering {
            return None;
        }
        let applied = match (state.applied_text.clone(), state.applied_range) {
            (Some(text), Some(range)) => Some((text, range)),
            _ => None,
        };
        if let Some(scope) = state.scope.take() {
            scope.cancel();
        }
        self.close_out(&slot, &mut state, true);
        applied
    }

    /// Dismiss the rendered suggestion without applying it.
    pub async fn dismiss(&self, session_id: &str) {
        let slot = self.registry.slot(session_id).await;
        let mut state = slot.state.lock().await;
        if state.phase != Phase::Rendering {
            return;
        }
        if let Some(scope) = state.scope.take() {
            scope.cancel();
        }
        self.close_out(&slot, &mut state, false);
    }

    /// Close out the slot's current cycle: clear the overlay if drawn,
    /// stamp the lifecycle, emit its record, and reset the slot. Cycles
    /// that never reached `Requesting` produce no record.
    fn close_out(&self, slot: &SessionSlot, state: &mut SlotState, accepted: bool) {
        if state.rendered {
            self.host.clear_suggestion(slot.session_id());
        }
        if let (Some(mut lifecycle), Some(request_id)) =
            (state.lifecycle.take(), state.request_id.take())
        {
            lifecycle.mark_hidden();
            if lifecycle.triggered() {
                self.telemetry.record(SuggestionRecord::from_lifecycle(
                    slot.session_id(),
                    &request_id,
                    &lifecycle,
                    accepted,
                ));
            }
        }
        state.reset();
    }

    /// Put the slot back to `Idle` after a cycle that produced nothing.
    /// A newer generation owns the slot already when the counters differ;
    /// in that case the slot is left alone.
    async fn settle_idle(&self, slot: &SessionSlot, generation: u64) {
        let mut state = slot.state.lock().await;
        if slot.generation() != generation {
            return;
        }
        if let Some(scope) = state.scope.take() {
            scope.cancel();
        }
        self.close_out(slot, &mut state, false);
    }

    async fn run_cycle(
        self: Arc<Self>,
        slot: Arc<SessionSlot>,
        generation: u64,
        scope: CancellationScope,
        kind: TriggerKind,
    ) {
        let config = match self.config.load() {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to load completion config: {e:#}");
                self.settle_idle(&slot, generation).await;
                return;
            }
        };
        if !config.enabled {
            self.settle_idle(&slot, generation).await;
            return;
        }

        tokio::select! {
            _ = scope.cancelled() => return,
            _ = tokio::time::sleep(Duration::from_millis(config.debounce_ms)) => {}
        }

        // Read the buffer after the debounce so the prompt reflects the
        // text the user ended up with, not the keystroke that started
        // the cycle. The offset is clamped once here; everything below,
        // including the candidate range, derives from the clamped value.
        let buffer = self.host.buffer_text(slot.session_id());
        let offset = clamp_offset(&buffer, self.host.cursor_offset(slot.session_id()));

        let ctx = match extract(
            &buffer,
            offset,
            config.budget.max_prefix_chars(),
            config.budget.max_suffix_chars(),
        ) {
            Some(ctx) => ctx,
            None => {
                self.settle_idle(&slot, generation).await;
                return;
            }
        };

        if kind == TriggerKind::Automatic {
            let verdict = trigger_verdict(&buffer, offset);
            if !verdict.is_valid() {
                debug!(?verdict, "automatic trigger suppressed");
                self.settle_idle(&slot, generation).await;
                return;
            }
        }

        {
            let mut state = slot.state.lock().await;
            if scope.is_cancelled() || slot.generation() != generation {
                return;
            }
            state.phase = Phase::Requesting;
            if let Some(lifecycle) = state.lifecycle.as_mut() {
                lifecycle.mark_triggered();
            }
        }

        let strategy = match ProviderStrategy::from_name(&config.strategy) {
            Some(s) => s,
            None => {
                warn!(strategy = %config.strategy, "unknown strategy, using single-line");
                ProviderStrategy::SingleLine
            }
        };

        let snippets = self.snippets.snippets(slot.session_id(), &ctx);
        let requests = match assemble(
            &ctx,
            &snippets,
            strategy,
            config.budget.max_prompt_chars(),
            config.budget.response_tokens,
            config.default_n,
        ) {
            Ok(reqs) => reqs,
            Err(e) => {
                match kind {
                    TriggerKind::Invoke => info!("prompt assembly failed: {e}"),
                    TriggerKind::Automatic => debug!("prompt assembly failed: {e}"),
                }
                self.settle_idle(&slot, generation).await;
                return;
            }
        };

        let backend = match self.backends.create(&config.endpoint) {
            Ok(b) => b,
            Err(e) => {
                if !self.provider_hint_shown.swap(true, Ordering::SeqCst) {
                    warn!("completion provider unavailable: {e}");
                } else {
                    debug!("completion provider unavailable: {e}");
                }
                self.settle_idle(&slot, generation).await;
                return;
            }
        };

        let winner = self.fan_out(backend, requests, &scope, kind).await;
        if scope.is_cancelled() {
            return;
        }
        let Some((inject, result)) = winner else {
            self.settle_idle(&slot, generation).await;
            return;
        };

        let line_suffix = current_line_suffix(&buffer, offset);
        let candidate = CompletionCandidate {
            insert_text: format!("{inject}{}", result.text),
            range: TextRange::new(offset, offset + line_suffix.len()),
            stop_reason: result.stop_reason,
        };
        let indent = self.host.indent_config(slot.session_id());
        let candidate = post_process(&candidate, &ctx.prefix, line_suffix, &indent);
        if candidate.insert_text.trim().is_empty() {
            self.settle_idle(&slot, generation).await;
            return;
        }

        let end = candidate.range.end.min(buffer.len());
        let original = &buffer[candidate.range.start.min(end)..end];
        let separator = self.host.line_separator(slot.session_id());
        let suggestion = match merge(&candidate, original, &separator) {
            Ok(s) => s,
            Err(e) => {
                match kind {
                    TriggerKind::Invoke => info!("completion not renderable: {e}"),
                    TriggerKind::Automatic => debug!("completion not renderable: {e}"),
                }
                self.settle_idle(&slot, generation).await;
                return;
            }
        };
        if suggestion.is_empty() {
            self.settle_idle(&slot, generation).await;
            return;
        }

        let mut state = slot.state.lock().await;
        if scope.is_cancelled() || slot.generation() != generation {
            return;
        }
        self.host.render_suggestion(slot.session_id(), &suggestion);
        state.phase = Phase::Rendering;
        state.rendered = true;
        state.applied_text = Some(candidate.insert_text.clone());
        state.applied_range = Some(candidate.range);
        if let Some(lifecycle) = state.lifecycle.as_mut() {
            lifecycle.mark_displayed();
        }
    }

    /// Issue every assembled request in parallel under the limiter and
    /// return the first result with non-empty text, paired with its
    /// injection seed. Losing requests are cancelled through a child
    /// scope once a winner is picked.
    async fn fan_out(
        &self,
        backend: Arc<dyn CompletionBackend>,
        requests: Vec<CompletionRequest>,
        scope: &CancellationScope,
        kind: TriggerKind,
    ) -> Option<(String, CompletionResult)> {
        let fanout = scope.child_scope();
        let total = requests.len();
        let (tx, mut rx) = mpsc::channel(total.max(1));

        for req in requests {
            let backend = backend.clone();
            let fanout = fanout.clone();
            let limiter = self.limiter.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let permit = tokio::select! {
                    _ = fanout.cancelled() => return,
                    permit = limiter.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return,
                    },
                };
                let result = backend.complete(&req, &fanout).await;
                drop(permit);
                let _ = tx.send((req.inject_prefix, result)).await;
            });
        }
        drop(tx);

        let mut winner = None;
        let mut received = 0;
        while received < total {
            let item = tokio::select! {
                _ = scope.cancelled() => break,
                item = rx.recv() => item,
            };
            let Some((inject, result)) = item else { break };
            received += 1;
            match result {
                Ok(res) if !res.is_empty() => {
                    winner = Some((inject, res));
                    break;
                }
                Ok(_) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => match kind {
                    TriggerKind::Invoke => info!("completion request failed: {e}"),
                    TriggerKind::Automatic => debug!("completion request failed: {e}"),
                },
            }
        }
        fanout.cancel();
        winner
    }
}
