//! Conversation persistence boundary.

use super::{Conversation, Message, MessageMetadata, Sender};
use crate::{DocvoxError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Persistence collaborator for conversations and their messages.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_conversation(&self, user_id: &str, title: &str) -> Result<Conversation>;

    async fn create_message(
        &self,
        conversation_id: Uuid,
        sender: Sender,
        content: &str,
        metadata: MessageMetadata,
    ) -> Result<Message>;

    /// Messages of one conversation in creation order.
    async fn fetch_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>>;

    async fn fetch_conversations(&self, user_id: &str) -> Result<Vec<Conversation>>;

    /// Delete a conversation and everything in it: messages first,
    /// then the conversation itself.
    async fn delete_conversation(&self, conversation_id: Uuid) -> Result<()>;
}

/// In-memory conversation store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryConversationStore {
    conversations: Arc<RwLock<Vec<Conversation>>>,
    messages: Arc<RwLock<Vec<Message>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create_conversation(&self, user_id: &str, title: &str) -> Result<Conversation> {
        let conversation = Conversation::new(user_id, title);
        self.conversations.write().push(conversation.clone());
        Ok(conversation)
    }

    async fn create_message(
        &self,
        conversation_id: Uuid,
        sender: Sender,
        content: &str,
        metadata: MessageMetadata,
    ) -> Result<Message> {
        let known = self
            .conversations
            .read()
            .iter()
            .any(|c| c.id == conversation_id);
        if !known {
            return Err(DocvoxError::Persistence(format!(
                "Unknown conversation {}",
                conversation_id
            )));
        }

        let message = Message::new(conversation_id, sender, content, metadata);
        self.messages.write().push(message.clone());
        Ok(message)
    }

    async fn fetch_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        Ok(self
            .messages
            .read()
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn fetch_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        Ok(self
            .conversations
            .read()
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_conversation(&self, conversation_id: Uuid) -> Result<()> {
        self.messages
            .write()
            .retain(|m| m.conversation_id != conversation_id);
        self.conversations.write().retain(|c| c.id != conversation_id);
        Ok(())
    }
}
