//! Conversation turns between a user and the product advisor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::loan::ProductId;
use crate::domain::user::UserId;

/// Maximum accepted length of one advisor question, in characters.
pub const QUESTION_MAX_CHARS: usize = 1000;

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// The authenticated user.
    User,
    /// The advisor model.
    Assistant,
}

impl ChatRole {
    /// Wire name used in JSON and in the message store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Label used when rendering the turn into a prompt line.
    #[must_use]
    pub const fn prompt_label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

impl std::str::FromStr for ChatRole {
    type Err = ChatValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(ChatValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Validation errors for conversation input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatValidationError {
    /// The role string was neither `user` nor `assistant`.
    #[error("unknown chat role: {value}")]
    UnknownRole {
        /// The rejected value.
        value: String,
    },
    /// The question was empty once trimmed.
    #[error("message must not be empty")]
    EmptyQuestion,
    /// The question exceeded [`QUESTION_MAX_CHARS`].
    #[error("message must be at most {max} characters")]
    QuestionTooLong {
        /// The configured ceiling.
        max: usize,
    },
}

/// One prior turn supplied by the client with a new question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    /// Who produced the turn.
    pub role: ChatRole,
    /// The turn text.
    pub content: String,
}

/// A free-form question addressed to the advisor, validated at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorQuestion(String);

impl AdvisorQuestion {
    /// Validate and construct an [`AdvisorQuestion`].
    pub fn new(message: impl Into<String>) -> Result<Self, ChatValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ChatValidationError::EmptyQuestion);
        }
        if message.chars().count() > QUESTION_MAX_CHARS {
            return Err(ChatValidationError::QuestionTooLong {
                max: QUESTION_MAX_CHARS,
            });
        }
        Ok(Self(message))
    }
}

impl AsRef<str> for AdvisorQuestion {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<AdvisorQuestion> for String {
    fn from(value: AdvisorQuestion) -> Self {
        value.0
    }
}

/// Persisted conversation turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Product the conversation is scoped to.
    pub product_id: ProductId,
    /// Who produced the turn.
    pub role: ChatRole,
    /// The turn text.
    pub content: String,
    /// Append timestamp.
    pub created_at: DateTime<Utc>,
}

/// Turn about to be appended to a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChatMessage {
    /// Owning user.
    pub user_id: UserId,
    /// Product the conversation is scoped to.
    pub product_id: ProductId,
    /// Who produced the turn.
    pub role: ChatRole,
    /// The turn text.
    pub content: String,
}

#[cfg(test)]
mod tests {
    //! Validation coverage for advisor questions.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn accepts_a_short_question() {
        let question = AdvisorQuestion::new("Can I prepay?").expect("valid question");
        assert_eq!(question.as_ref(), "Can I prepay?");
    }

    #[rstest]
    fn rejects_blank_questions() {
        assert_eq!(
            AdvisorQuestion::new("   "),
            Err(ChatValidationError::EmptyQuestion)
        );
    }

    #[rstest]
    fn enforces_the_length_ceiling() {
        let at_limit = "q".repeat(QUESTION_MAX_CHARS);
        assert!(AdvisorQuestion::new(at_limit).is_ok());

        let over_limit = "q".repeat(QUESTION_MAX_CHARS + 1);
        assert_eq!(
            AdvisorQuestion::new(over_limit),
            Err(ChatValidationError::QuestionTooLong {
                max: QUESTION_MAX_CHARS
            })
        );
    }

    #[rstest]
    fn role_round_trips_wire_names() {
        let role: ChatRole = "assistant".parse().expect("known role");
        assert_eq!(role, ChatRole::Assistant);
        assert_eq!(role.as_str(), "assistant");
        assert_eq!(role.prompt_label(), "Assistant");
    }
}
