pub mod cancel;
pub mod config;
pub mod error;

pub use cancel::CancellationScope;
pub use error::CompletionError;
