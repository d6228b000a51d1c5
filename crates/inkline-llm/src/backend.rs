use async_trait::async_trait;
use inkline_common::{CancellationScope, CompletionError};
use inkline_prompt::CompletionRequest;

/// A raw model completion before post-processing.
#[derive(Debug, Clone)]
pub struct CompletionResult {
    pub text: String,
    pub stop_reason: String,
}

impl CompletionResult {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The single RPC this pipeline consumes: one prompt in, one completion
/// out. Implementations must honor mid-flight cancellation of `cancel`
/// by returning `CompletionError::Cancelled`.
#[async_trait]
pub trait CompletionBackend: Send + Sync + std::fmt::Debug {
    async fn complete(
        &self,
        req: &CompletionRequest,
        cancel: &CancellationScope,
    ) -> Result<CompletionResult, CompletionError>;

    fn name(&self) -> &str;
}
