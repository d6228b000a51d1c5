pub mod coordinator;
pub mod reducer;
pub mod registry;

pub use coordinator::Coordinator;
pub use reducer::{reduce, Effect, Phase};
pub use registry::{SessionRegistry, SessionSlot};
