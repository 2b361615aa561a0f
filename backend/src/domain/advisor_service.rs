//! Product-scoped AI advisor.
//!
//! Renders the product context prompt, calls the completion port, and
//! persists the turn pair as an explicit two-phase write: the user turn is
//! written before the model call, the assistant turn after it succeeds. A
//! failed call therefore leaves an orphaned user turn; transcript reads
//! reconcile by dropping trailing user-only turns.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::chat::{AdvisorQuestion, ChatMessage, ChatRole, ChatTurn, NewChatMessage};
use crate::domain::error::Error;
use crate::domain::loan::{Product, ProductId};
use crate::domain::ports::{
    ChatStoreError, ChatTranscriptRepository, CompletionSource, CompletionSourceError,
    ProductRepository, ProductStoreError,
};
use crate::domain::prompt::render_advisor_prompt;
use crate::domain::user::UserId;

/// One advisor question with the client-held conversation so far.
#[derive(Debug, Clone)]
pub struct AdvisorRequest {
    /// Product the question is scoped to.
    pub product_id: ProductId,
    /// The new question.
    pub question: AdvisorQuestion,
    /// Prior turns, oldest first; passed through without truncation.
    pub history: Vec<ChatTurn>,
}

/// Advisor service over the product store, transcript store, and model API.
#[derive(Clone)]
pub struct AdvisorService {
    products: Arc<dyn ProductRepository>,
    transcripts: Arc<dyn ChatTranscriptRepository>,
    completions: Arc<dyn CompletionSource>,
}

fn map_product_error(error: ProductStoreError) -> Error {
    match error {
        ProductStoreError::Connection { message } => Error::service_unavailable(message),
        ProductStoreError::Query { message } => Error::internal(message),
    }
}

fn map_chat_error(error: ChatStoreError) -> Error {
    match error {
        ChatStoreError::Connection { message } => Error::service_unavailable(message),
        ChatStoreError::Query { message } => Error::internal(message),
    }
}

fn map_completion_error(error: CompletionSourceError) -> Error {
    match error {
        CompletionSourceError::RateLimited { message }
        | CompletionSourceError::Timeout { message }
        | CompletionSourceError::Transport { message } => Error::service_unavailable(message),
        CompletionSourceError::InvalidRequest { message }
        | CompletionSourceError::Decode { message } => Error::internal(message),
    }
}

impl AdvisorService {
    /// Create a service over the three collaborating ports.
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductRepository>,
        transcripts: Arc<dyn ChatTranscriptRepository>,
        completions: Arc<dyn CompletionSource>,
    ) -> Self {
        Self {
            products,
            transcripts,
            completions,
        }
    }

    /// Answer one question about one product.
    ///
    /// Unknown products are a not-found failure. Model failures surface to
    /// the caller unretried after the user turn has been written (phase
    /// one); the assistant turn (phase two) is only written on success.
    pub async fn ask(&self, user_id: &UserId, request: AdvisorRequest) -> Result<String, Error> {
        let product = self.load_product(&request.product_id).await?;
        let prompt = render_advisor_prompt(&product, &request.history, &request.question);
        debug!(
            product = %product.id,
            history_turns = request.history.len(),
            prompt_bytes = prompt.len(),
            "advisor prompt rendered"
        );

        self.transcripts
            .append(&NewChatMessage {
                user_id: user_id.clone(),
                product_id: product.id.clone(),
                role: ChatRole::User,
                content: request.question.as_ref().to_owned(),
            })
            .await
            .map_err(map_chat_error)?;

        let reply = self
            .completions
            .complete(&prompt)
            .await
            .map_err(|error| {
                warn!(product = %product.id, %error, "completion call failed after phase-one write");
                map_completion_error(error)
            })?;

        self.transcripts
            .append(&NewChatMessage {
                user_id: user_id.clone(),
                product_id: product.id.clone(),
                role: ChatRole::Assistant,
                content: reply.clone(),
            })
            .await
            .map_err(map_chat_error)?;

        Ok(reply)
    }

    /// Persisted transcript for one user and product, oldest first.
    ///
    /// Reconciles the non-atomic pair write: trailing user turns with no
    /// assistant reply are dropped from the view (the rows stay in place).
    pub async fn transcript(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Vec<ChatMessage>, Error> {
        // 404 on unknown products, matching the ask path.
        let _ = self.load_product(product_id).await?;
        let mut messages = self
            .transcripts
            .history(user_id, product_id)
            .await
            .map_err(map_chat_error)?;
        while messages.last().is_some_and(|turn| turn.role == ChatRole::User) {
            let _ = messages.pop();
        }
        Ok(messages)
    }

    async fn load_product(&self, product_id: &ProductId) -> Result<Product, Error> {
        self.products
            .find_by_id(product_id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| Error::not_found("loan product not found"))
    }
}
