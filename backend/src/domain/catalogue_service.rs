//! Catalog browsing and eligibility ranking.
//!
//! Thin orchestration over the product port: validation happens at the
//! inbound boundary, the store applies the filter semantics, and this
//! service maps persistence failures into domain errors.

use std::sync::Arc;

use tracing::debug;

use crate::domain::error::Error;
use crate::domain::filters::ProductFilters;
use crate::domain::loan::Product;
use crate::domain::ports::{ProductRepository, ProductStoreError};
use crate::domain::user::AnnualIncome;

/// Number of products returned by the eligibility shortlist.
pub const SHORTLIST_LIMIT: i64 = 5;

/// Catalog Filter and Eligibility Ranker over the product store.
#[derive(Clone)]
pub struct CatalogueService {
    products: Arc<dyn ProductRepository>,
}

fn map_store_error(error: ProductStoreError) -> Error {
    match error {
        ProductStoreError::Connection { message } => Error::service_unavailable(message),
        ProductStoreError::Query { message } => Error::internal(message),
    }
}

impl CatalogueService {
    /// Create a service backed by the given product repository.
    #[must_use]
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// List products matching every supplied filter, ascending by APR.
    ///
    /// Callers validate the filter bounds before reaching this method; the
    /// full matching set is returned without pagination.
    pub async fn browse(&self, filters: &ProductFilters) -> Result<Vec<Product>, Error> {
        let products = self.products.list(filters).await.map_err(map_store_error)?;
        debug!(matched = products.len(), "catalog browse");
        Ok(products)
    }

    /// The 5 lowest-APR products whose income floor the caller clears.
    ///
    /// Degenerate input never errors: a non-positive income or an empty
    /// qualifying set yields an empty sequence and callers render a
    /// "no match" state.
    pub async fn shortlist(&self, income: Option<AnnualIncome>) -> Result<Vec<Product>, Error> {
        let Some(income) = income else {
            return Ok(Vec::new());
        };
        self.products
            .shortlist(income.rupees(), SHORTLIST_LIMIT)
            .await
            .map_err(map_store_error)
    }
}
