//! Port abstraction for user persistence adapters.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::{AnnualIncome, Email, SignInProfile, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserStoreError {
        /// Repository connection could not be established.
        Connection => "user store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "user store query failed: {message}",
    }
}

/// Persistence operations on user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user keyed by email, or refresh name/avatar on conflict.
    async fn upsert_identity(&self, profile: &SignInProfile) -> Result<User, UserStoreError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError>;

    /// Fetch a user by email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserStoreError>;

    /// Set the declared income and the onboarding flag in one mutation.
    ///
    /// Returns `None` when no record matched, so callers can report a write
    /// failure distinctly from a validation failure.
    async fn set_annual_income(
        &self,
        id: &UserId,
        income: AnnualIncome,
    ) -> Result<Option<User>, UserStoreError>;
}

/// In-memory user store used by tests and database-less runs.
#[derive(Debug, Default)]
pub struct FixtureUserRepository {
    users: std::sync::Mutex<Vec<User>>,
}

impl FixtureUserRepository {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<User>>, UserStoreError> {
        self.users
            .lock()
            .map_err(|_| UserStoreError::connection("fixture user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn upsert_identity(&self, profile: &SignInProfile) -> Result<User, UserStoreError> {
        let mut users = self.lock()?;
        let now = Utc::now();
        if let Some(existing) = users.iter_mut().find(|user| user.email == profile.email) {
            existing.display_name.clone_from(&profile.display_name);
            existing.avatar_url.clone_from(&profile.avatar_url);
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let user = User {
            id: UserId::random(),
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            avatar_url: profile.avatar_url.clone(),
            annual_income: None,
            onboarding_completed: false,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError> {
        Ok(self.lock()?.iter().find(|user| &user.id == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserStoreError> {
        Ok(self.lock()?.iter().find(|user| &user.email == email).cloned())
    }

    async fn set_annual_income(
        &self,
        id: &UserId,
        income: AnnualIncome,
    ) -> Result<Option<User>, UserStoreError> {
        let mut users = self.lock()?;
        let Some(user) = users.iter_mut().find(|user| &user.id == id) else {
            return Ok(None);
        };
        user.annual_income = Some(income);
        user.onboarding_completed = true;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}
