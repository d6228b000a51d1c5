use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

type Callback = Box<dyn FnOnce() + Send>;

/// Cooperative cancellation threaded through every asynchronous step of a
/// trigger cycle. Owns a cancelled flag plus a list of callbacks invoked
/// exactly once when the scope is cancelled.
///
/// An operation observing a cancelled scope must stop before any
/// externally visible side effect (overlay mutation, telemetry emission).
#[derive(Clone)]
pub struct CancellationScope {
    inner: Arc<Inner>,
}

struct Inner {
    token: CancellationToken,
    callbacks: Mutex<Vec<Callback>>,
}

impl CancellationScope {
    pub fn new() -> Self {
        Self::from_token(CancellationToken::new())
    }

    fn from_token(token: CancellationToken) -> Self {
        Self {
            inner: Arc::new(Inner {
                token,
                callbacks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Derive a scope that is cancelled whenever this one is. Cancelling
    /// the child does not cancel the parent. Callbacks registered on the
    /// child fire only on an explicit `cancel()` of the child.
    pub fn child_scope(&self) -> Self {
        Self::from_token(self.inner.token.child_token())
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Cancel the scope and run all registered callbacks. Idempotent:
    /// later calls are no-ops.
    pub fn cancel(&self) {
        if self.inner.token.is_cancelled() {
            return;
        }
        self.inner.token.cancel();
        let callbacks: Vec<Callback> = {
            let mut guard = self.inner.callbacks.lock().unwrap_or_else(|e| e.into_inner());
            guard.drain(..).collect()
        };
        for cb in callbacks {
            cb();
        }
    }

    /// Register a callback to run once on cancellation. If the scope is
    /// already cancelled the callback runs immediately.
    pub fn on_cancel<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let run_now = {
            let mut guard = self.inner.callbacks.lock().unwrap_or_else(|e| e.into_inner());
            if self.inner.token.is_cancelled() {
                true
            } else {
                guard.push(Box::new(f));
                return;
            }
        };
        if run_now {
            f();
        }
    }

    /// Resolves when the scope (or an ancestor) is cancelled.
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await
    }
}

impl Default for CancellationScope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_cancel_sets_flag() {
        let scope = CancellationScope::new();
        assert!(!scope.is_cancelled());
        scope.cancel();
        assert!(scope.is_cancelled());
    }

    #[test]
    fn test_callbacks_run_exactly_once() {
        let scope = CancellationScope::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        scope.on_cancel(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        scope.cancel();
        scope.cancel();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_on_cancel_after_cancel_runs_immediately() {
        let scope = CancellationScope::new();
        scope.cancel();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        scope.on_cancel(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_child_cancelled_with_parent() {
        let parent = CancellationScope::new();
        let child = parent.child_scope();
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_child_cancel_leaves_parent_alive() {
        let parent = CancellationScope::new();
        let child = parent.child_scope();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let scope = CancellationScope::new();
        let waiter = scope.clone();
        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
        });
        scope.cancel();
        handle.await.unwrap();
    }
}
