//! PostgreSQL-backed `ChatTranscriptRepository` implementation using Diesel.
//!
//! The table is append-only; ordering within one user/product transcript is
//! by insertion timestamp with the identifier as a stable tiebreaker.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ChatStoreError, ChatTranscriptRepository};
use crate::domain::{ChatMessage, NewChatMessage, ProductId, UserId};

use super::diesel_error::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ChatMessageRow, NewChatMessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::chat_messages;

/// Diesel-backed implementation of the `ChatTranscriptRepository` port.
#[derive(Clone)]
pub struct DieselChatTranscriptRepository {
    pool: DbPool,
}

impl DieselChatTranscriptRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ChatStoreError {
    map_basic_pool_error(error, ChatStoreError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ChatStoreError {
    map_basic_diesel_error(error, ChatStoreError::query, ChatStoreError::connection)
}

#[async_trait]
impl ChatTranscriptRepository for DieselChatTranscriptRepository {
    async fn append(&self, message: &NewChatMessage) -> Result<ChatMessage, ChatStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: ChatMessageRow = diesel::insert_into(chat_messages::table)
            .values(&NewChatMessageRow {
                id: Uuid::new_v4(),
                user_id: *message.user_id.as_uuid(),
                product_id: *message.product_id.as_uuid(),
                role: message.role.as_str(),
                content: &message.content,
            })
            .returning(ChatMessageRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row.into_domain().map_err(ChatStoreError::query)
    }

    async fn history(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Vec<ChatMessage>, ChatStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ChatMessageRow> = chat_messages::table
            .filter(chat_messages::user_id.eq(user_id.as_uuid()))
            .filter(chat_messages::product_id.eq(product_id.as_uuid()))
            .order((chat_messages::created_at.asc(), chat_messages::id.asc()))
            .select(ChatMessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| row.into_domain().map_err(ChatStoreError::query))
            .collect()
    }
}
