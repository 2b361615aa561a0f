//! User identity, income, and onboarding state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Upper bound accepted for a declared annual income, in rupees.
pub const ANNUAL_INCOME_MAX: i64 = 100_000_000;

/// Validation errors for user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The user id was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// The user id was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The email address was empty or malformed.
    #[error("email address must contain a local part and a domain")]
    InvalidEmail,
    /// The declared income was zero or negative.
    #[error("annual income must be positive")]
    NonPositiveIncome,
    /// The declared income exceeded [`ANNUAL_INCOME_MAX`].
    #[error("annual income must be at most {max}")]
    IncomeTooLarge {
        /// The configured ceiling.
        max: i64,
    },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

// `derive(ToSchema)` cannot express `value_type = String, format = Uuid` on a
// two-field tuple struct, so the equivalent schema is written by hand.
impl utoipa::PartialSchema for UserId {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        utoipa::openapi::schema::ObjectBuilder::new()
            .schema_type(utoipa::openapi::schema::Type::String)
            .format(Some(utoipa::openapi::schema::SchemaFormat::KnownFormat(
                utoipa::openapi::schema::KnownFormat::Uuid,
            )))
            .into()
    }
}

impl ToSchema for UserId {}

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Email address used as the unique user key.
///
/// Validation is deliberately shallow: the identity provider has already
/// verified the address, so only structural mistakes are rejected here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, format = Email)]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        let trimmed = email.trim();
        let valid = trimmed
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Declared annual income in whole rupees.
///
/// Bounded to 1..=[`ANNUAL_INCOME_MAX`]; requests outside the range are a
/// validation failure, never a write failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct AnnualIncome(i64);

// `derive(ToSchema)` cannot express `value_type = i64, minimum = 1,
// maximum = 100_000_000` on a tuple struct, so the equivalent schema is
// written by hand.
impl utoipa::PartialSchema for AnnualIncome {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        utoipa::openapi::schema::ObjectBuilder::new()
            .schema_type(utoipa::openapi::schema::Type::Integer)
            .format(Some(utoipa::openapi::schema::SchemaFormat::KnownFormat(
                utoipa::openapi::schema::KnownFormat::Int64,
            )))
            .minimum(Some(1))
            .maximum(Some(ANNUAL_INCOME_MAX))
            .into()
    }
}

impl ToSchema for AnnualIncome {}

impl AnnualIncome {
    /// Validate and construct an [`AnnualIncome`].
    pub fn new(income: i64) -> Result<Self, UserValidationError> {
        if income <= 0 {
            return Err(UserValidationError::NonPositiveIncome);
        }
        if income > ANNUAL_INCOME_MAX {
            return Err(UserValidationError::IncomeTooLarge {
                max: ANNUAL_INCOME_MAX,
            });
        }
        Ok(Self(income))
    }

    /// The income value in rupees.
    #[must_use]
    pub const fn rupees(self) -> i64 {
        self.0
    }
}

impl From<AnnualIncome> for i64 {
    fn from(value: AnnualIncome) -> Self {
        value.0
    }
}

impl TryFrom<i64> for AnnualIncome {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Profile handed over by the identity provider on sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInProfile {
    /// Verified email address, the upsert key.
    pub email: Email,
    /// Optional display name from the provider.
    pub display_name: Option<String>,
    /// Optional avatar reference from the provider.
    pub avatar_url: Option<String>,
}

/// One authenticated identity.
///
/// ## Invariants
/// - `onboarding_completed` is true iff `annual_income` is present; both are
///   mutated together by the income update and nowhere else.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Unique email key.
    pub email: Email,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Optional avatar reference (wire name `image`).
    pub avatar_url: Option<String>,
    /// Declared annual income, absent until onboarding completes.
    pub annual_income: Option<AnnualIncome>,
    /// Whether the one-time income declaration has happened.
    pub onboarding_completed: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}
