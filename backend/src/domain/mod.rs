//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed domain entities used by the API and
//! persistence layers, plus the services orchestrating the ports in
//! [`ports`]. Types stay immutable; invariants and serialisation contracts
//! live in each type's Rustdoc.

pub mod advisor_service;
pub mod catalogue_service;
pub mod chat;
pub mod error;
pub mod filters;
pub mod loan;
pub mod onboarding_service;
pub mod ports;
pub mod prompt;
pub mod user;

pub use self::advisor_service::{AdvisorRequest, AdvisorService};
pub use self::catalogue_service::{CatalogueService, SHORTLIST_LIMIT};
pub use self::chat::{
    AdvisorQuestion, ChatMessage, ChatRole, ChatTurn, ChatValidationError, NewChatMessage,
    QUESTION_MAX_CHARS,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::filters::{FilterValidationError, ProductFilters};
pub use self::loan::{
    DisbursalSpeed, DocsLevel, Faq, LoanType, Product, ProductId, ProductSpec,
    ProductValidationError,
};
pub use self::onboarding_service::OnboardingService;
pub use self::prompt::{format_inr, render_advisor_prompt};
pub use self::user::{
    ANNUAL_INCOME_MAX, AnnualIncome, Email, SignInProfile, User, UserId, UserValidationError,
};

/// Response header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "Trace-Id";
