pub mod candidate;
pub mod merge;
pub mod postprocess;

pub use candidate::CompletionCandidate;
pub use merge::merge;
pub use postprocess::post_process;
