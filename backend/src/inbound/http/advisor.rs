//! Product-scoped AI advisor endpoints.
//!
//! ```text
//! POST /api/ai/ask {"productId":"...","message":"Can I prepay?","history":[...]}
//! GET /api/ai/history/{product_id}
//! ```

use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use utoipa::ToSchema;

use crate::domain::{
    AdvisorQuestion, AdvisorRequest, ChatMessage, ChatRole, ChatTurn, ChatValidationError, Error,
    ProductId, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/ai/ask`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    /// Product the question is scoped to.
    pub product_id: String,
    /// The new question, 1 to 1000 characters.
    pub message: String,
    /// Prior turns held by the client, oldest first.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// Response body for `POST /api/ai/ask`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    /// The advisor's reply.
    pub response: String,
}

/// Wire representation of one persisted conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessageDto {
    /// Message identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Product the conversation is scoped to.
    pub product_id: ProductId,
    /// Who produced the turn.
    pub role: ChatRole,
    /// Turn text.
    pub content: String,
    /// Persistence time.
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageDto {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            user_id: message.user_id,
            product_id: message.product_id,
            role: message.role,
            content: message.content,
            created_at: message.created_at,
        }
    }
}

/// Response body for `GET /api/ai/history/{product_id}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TranscriptResponse {
    /// Persisted turns, oldest first.
    pub messages: Vec<ChatMessageDto>,
}

fn parse_product_id(raw: &str) -> Result<ProductId, Error> {
    ProductId::new(raw).map_err(|_| {
        Error::invalid_request("productId must be a valid UUID")
            .with_details(json!({ "field": "productId", "value": raw }))
    })
}

fn map_question_error(err: ChatValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": "message" }))
}

/// Ask the advisor one question about one product.
#[utoipa::path(
    post,
    path = "/api/ai/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Advisor reply", body = AskResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown product", body = Error),
        (status = 503, description = "Model or store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["advisor"],
    operation_id = "askAdvisor"
)]
#[post("/ai/ask")]
pub async fn ask(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<AskRequest>,
) -> ApiResult<web::Json<AskResponse>> {
    let user_id = session.require_user_id()?;
    // `history` alone would resolve to the route struct generated by the
    // `#[get]` macro on the handler below, so the field needs a fresh name.
    let AskRequest {
        product_id,
        message,
        history: prior_turns,
    } = payload.into_inner();
    let request = AdvisorRequest {
        product_id: parse_product_id(&product_id)?,
        question: AdvisorQuestion::new(message).map_err(map_question_error)?,
        history: prior_turns,
    };
    let response = state.advisor.ask(&user_id, request).await?;
    Ok(web::Json(AskResponse { response }))
}

/// Fetch the caller's persisted transcript for one product.
#[utoipa::path(
    get,
    path = "/api/ai/history/{product_id}",
    params(("product_id" = String, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "Transcript, oldest first", body = TranscriptResponse),
        (status = 400, description = "Malformed product id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown product", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["advisor"],
    operation_id = "advisorHistory"
)]
#[get("/ai/history/{product_id}")]
pub async fn history(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<TranscriptResponse>> {
    let user_id = session.require_user_id()?;
    let product_id = parse_product_id(&path.into_inner())?;
    let messages = state.advisor.transcript(&user_id, &product_id).await?;
    Ok(web::Json(TranscriptResponse {
        messages: messages.into_iter().map(ChatMessageDto::from).collect(),
    }))
}
