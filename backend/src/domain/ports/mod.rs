//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod chat_repository;
mod completion_source;
mod product_repository;
mod user_repository;

pub use chat_repository::{ChatStoreError, ChatTranscriptRepository, FixtureChatTranscriptRepository};
pub use completion_source::{CompletionSource, CompletionSourceError, FixtureCompletionSource};
pub use product_repository::{FixtureProductRepository, ProductRepository, ProductStoreError};
pub use user_repository::{FixtureUserRepository, UserRepository, UserStoreError};
