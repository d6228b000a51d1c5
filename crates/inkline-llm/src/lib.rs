pub mod anthropic;
pub mod backend;
pub mod factory;
pub mod openai_compat;

pub use backend::{CompletionBackend, CompletionResult};
pub use factory::{create_backend, BackendFactory, LlmBackendFactory};
