//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureChatTranscriptRepository, FixtureCompletionSource, FixtureProductRepository,
    FixtureUserRepository,
};
use crate::domain::{AdvisorService, CatalogueService, OnboardingService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Catalog browsing and eligibility ranking.
    pub catalogue: CatalogueService,
    /// Product-scoped AI advisor.
    pub advisor: AdvisorService,
    /// Sign-in and income declaration.
    pub onboarding: OnboardingService,
}

impl HttpState {
    /// Construct state from the three domain services.
    #[must_use]
    pub fn new(
        catalogue: CatalogueService,
        advisor: AdvisorService,
        onboarding: OnboardingService,
    ) -> Self {
        Self {
            catalogue,
            advisor,
            onboarding,
        }
    }

    /// State wired entirely to in-memory fixture ports.
    ///
    /// Used by handler tests and by no-database runs of the server.
    #[must_use]
    pub fn fixture() -> Self {
        let products = Arc::new(FixtureProductRepository::new());
        Self::new(
            CatalogueService::new(products.clone()),
            AdvisorService::new(
                products,
                Arc::new(FixtureChatTranscriptRepository::new()),
                Arc::new(FixtureCompletionSource::default()),
            ),
            OnboardingService::new(Arc::new(FixtureUserRepository::new())),
        )
    }
}
