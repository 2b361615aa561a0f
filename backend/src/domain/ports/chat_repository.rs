//! Port abstraction for the append-only conversation store.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::chat::{ChatMessage, NewChatMessage};
use crate::domain::loan::ProductId;
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by chat transcript adapters.
    pub enum ChatStoreError {
        /// Repository connection could not be established.
        Connection => "chat store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "chat store query failed: {message}",
    }
}

/// Append-only storage for user↔product conversation turns.
#[async_trait]
pub trait ChatTranscriptRepository: Send + Sync {
    /// Append one turn and return the persisted record.
    async fn append(&self, message: &NewChatMessage) -> Result<ChatMessage, ChatStoreError>;

    /// All turns for one user and product, oldest first.
    async fn history(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Vec<ChatMessage>, ChatStoreError>;
}

/// In-memory transcript store used by tests and database-less runs.
#[derive(Debug, Default)]
pub struct FixtureChatTranscriptRepository {
    messages: std::sync::Mutex<Vec<ChatMessage>>,
}

impl FixtureChatTranscriptRepository {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<ChatMessage>>, ChatStoreError> {
        self.messages
            .lock()
            .map_err(|_| ChatStoreError::connection("fixture chat store lock poisoned"))
    }
}

#[async_trait]
impl ChatTranscriptRepository for FixtureChatTranscriptRepository {
    async fn append(&self, message: &NewChatMessage) -> Result<ChatMessage, ChatStoreError> {
        let persisted = ChatMessage {
            id: Uuid::new_v4(),
            user_id: message.user_id.clone(),
            product_id: message.product_id.clone(),
            role: message.role,
            content: message.content.clone(),
            created_at: Utc::now(),
        };
        self.lock()?.push(persisted.clone());
        Ok(persisted)
    }

    async fn history(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Vec<ChatMessage>, ChatStoreError> {
        // Append order doubles as chronological order here.
        Ok(self
            .lock()?
            .iter()
            .filter(|message| &message.user_id == user_id && &message.product_id == product_id)
            .cloned()
            .collect())
    }
}
