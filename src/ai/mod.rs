pub mod chat;
pub mod local;
pub mod prompt;

pub use chat::{ChatClient, ChatError, Message};
pub use local::LocalAdvisor;
pub use prompt::PlantContext;
