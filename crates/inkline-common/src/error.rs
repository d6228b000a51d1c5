use thiserror::Error;

/// Failure modes of a completion cycle.
///
/// `Cancelled` is not a real error: a superseded request drops all its
/// results silently. Nothing here is retried; the next qualifying editor
/// event is the retry mechanism.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The prompt's fixed overhead (template plus prefix/suffix, no
    /// snippets) already exceeds the character budget. No request is sent.
    #[error("prompt overhead of {overhead} chars exceeds budget of {budget}")]
    PromptOverflow { overhead: usize, budget: usize },

    /// No usable provider is configured for this cycle.
    #[error("no usable completion provider: {0}")]
    ProviderUnavailable(String),

    /// The remote call failed or the response could not be decoded.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The diff merger found a non-insertion edit; the whole candidate is
    /// dropped rather than ever rewriting buffer text.
    #[error("candidate rejected: suggestion would modify existing text")]
    RenderRejected,

    /// The request was superseded or the session lost focus.
    #[error("request cancelled")]
    Cancelled,
}

impl CompletionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CompletionError::Cancelled)
    }
}
