pub mod assemble;
pub mod snippet;
pub mod strategy;

pub use assemble::{assemble, fixed_overhead, template_for, CompletionRequest, PromptMessage, Role};
pub use snippet::{NoSnippets, ReferenceSnippet, SnippetSource};
pub use strategy::{ProviderStrategy, StrategyParams};
