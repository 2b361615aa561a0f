//! Sign-in completion, profile reads, and the one-time income declaration.

use std::sync::Arc;

use tracing::info;

use crate::domain::error::Error;
use crate::domain::ports::{UserRepository, UserStoreError};
use crate::domain::user::{AnnualIncome, SignInProfile, User, UserId};

/// Onboarding service over the user store.
#[derive(Clone)]
pub struct OnboardingService {
    users: Arc<dyn UserRepository>,
}

fn map_store_error(error: UserStoreError) -> Error {
    match error {
        UserStoreError::Connection { message } => Error::service_unavailable(message),
        UserStoreError::Query { message } => Error::internal(message),
    }
}

impl OnboardingService {
    /// Create a service backed by the given user repository.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Complete a sign-in: upsert the verified profile keyed by email.
    pub async fn sign_in(&self, profile: &SignInProfile) -> Result<User, Error> {
        let user = self
            .users
            .upsert_identity(profile)
            .await
            .map_err(map_store_error)?;
        info!(user = %user.id, "sign-in upsert complete");
        Ok(user)
    }

    /// Current profile for the authenticated identity.
    pub async fn profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("user record not found"))
    }

    /// Declare the annual income, completing onboarding.
    ///
    /// Idempotent: repeating the same valid income leaves the record in the
    /// same final state. A mutation that matches no row is a write failure
    /// (500), reported distinctly from validation (400, raised before this
    /// method by the boundary).
    pub async fn declare_income(
        &self,
        user_id: &UserId,
        income: AnnualIncome,
    ) -> Result<User, Error> {
        let updated = self
            .users
            .set_annual_income(user_id, income)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::internal("income update affected no user record"))?;
        info!(user = %updated.id, "onboarding completed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    //! Idempotence and failure-path coverage for onboarding.

    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::FixtureUserRepository;
    use crate::domain::user::Email;

    fn service() -> OnboardingService {
        OnboardingService::new(Arc::new(FixtureUserRepository::new()))
    }

    fn profile() -> SignInProfile {
        SignInProfile {
            email: Email::new("ada@example.com").expect("valid email"),
            display_name: Some("Ada".to_owned()),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn income_update_is_idempotent() {
        let service = service();
        let user = service.sign_in(&profile()).await.expect("sign in");
        let income = AnnualIncome::new(400_000).expect("valid income");

        let first = service
            .declare_income(&user.id, income)
            .await
            .expect("first update");
        assert!(first.onboarding_completed);
        assert_eq!(first.annual_income, Some(income));

        let second = service
            .declare_income(&user.id, income)
            .await
            .expect("second update");
        assert_eq!(second.annual_income, first.annual_income);
        assert!(second.onboarding_completed);
    }

    #[tokio::test]
    async fn missing_record_is_a_write_failure() {
        let service = service();
        let income = AnnualIncome::new(400_000).expect("valid income");
        let err = service
            .declare_income(&UserId::random(), income)
            .await
            .expect_err("no matching row");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn profile_reports_unknown_identities() {
        let service = service();
        let err = service
            .profile(&UserId::random())
            .await
            .expect_err("unknown user");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
