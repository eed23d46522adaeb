pub mod store;
pub mod types;

pub use store::{ConversationStore, InMemoryConversationStore};
pub use types::{Conversation, Message, MessageMetadata, Sender};
