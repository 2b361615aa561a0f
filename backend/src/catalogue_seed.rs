//! Embedded loan catalog seed data.
//!
//! The catalog ships inside the binary so a fresh deployment serves real
//! products without an out-of-band import step. Seeding is idempotent: the
//! records are inserted only when the store is empty, so redeployments never
//! duplicate the catalog.

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::domain::ports::{ProductRepository, ProductStoreError};
use crate::domain::{
    DisbursalSpeed, DocsLevel, Faq, LoanType, Product, ProductId, ProductSpec,
    ProductValidationError,
};

const CATALOGUE_JSON: &str = include_str!("../fixtures/catalogue.json");

/// Errors raised while loading or inserting the embedded catalog.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// The embedded JSON document could not be parsed.
    #[error("embedded catalog is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    /// An entry parsed but failed a catalog invariant.
    #[error("embedded catalog entry {name:?} rejected: {source}")]
    Invalid {
        /// Marketing name of the offending entry.
        name: String,
        /// The violated invariant.
        source: ProductValidationError,
    },
    /// The product store refused the count or insert.
    #[error(transparent)]
    Store(#[from] ProductStoreError),
}

/// One catalog entry as authored in the seed document.
#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    bank: String,
    #[serde(rename = "type")]
    loan_type: LoanType,
    rate_apr: f64,
    min_income: i64,
    min_credit_score: i32,
    tenure_min_months: i32,
    tenure_max_months: i32,
    processing_fee_pct: f64,
    prepayment_allowed: bool,
    disbursal_speed: DisbursalSpeed,
    docs_level: DocsLevel,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    faq: Vec<Faq>,
    #[serde(default = "default_terms")]
    terms: Value,
}

fn default_terms() -> Value {
    Value::Object(serde_json::Map::new())
}

impl SeedProduct {
    /// Promote a parsed entry to a validated catalog record.
    ///
    /// Identifiers and timestamps are assigned here; the seed document only
    /// carries the product attributes.
    fn into_product(self) -> Result<Product, SeedError> {
        let name = self.name.clone();
        Product::try_new(ProductSpec {
            id: ProductId::random(),
            name: self.name,
            bank: self.bank,
            loan_type: self.loan_type,
            rate_apr: self.rate_apr,
            min_income: self.min_income,
            min_credit_score: self.min_credit_score,
            tenure_min_months: self.tenure_min_months,
            tenure_max_months: self.tenure_max_months,
            processing_fee_pct: self.processing_fee_pct,
            prepayment_allowed: self.prepayment_allowed,
            disbursal_speed: self.disbursal_speed,
            docs_level: self.docs_level,
            summary: self.summary,
            faq: self.faq,
            terms: self.terms,
            created_at: Utc::now(),
        })
        .map_err(|source| SeedError::Invalid { name, source })
    }
}

fn parse_catalogue(document: &str) -> Result<Vec<Product>, SeedError> {
    let entries: Vec<SeedProduct> = serde_json::from_str(document)?;
    entries.into_iter().map(SeedProduct::into_product).collect()
}

/// Parse and validate the embedded catalog.
///
/// # Errors
///
/// Returns an error when the embedded document is malformed or an entry
/// violates a catalog invariant.
pub fn load_catalogue() -> Result<Vec<Product>, SeedError> {
    parse_catalogue(CATALOGUE_JSON)
}

/// Insert the embedded catalog when the store holds no products.
///
/// Returns the number of records inserted: zero when the store was already
/// populated.
///
/// # Errors
///
/// Returns an error when the embedded catalog fails validation or the store
/// rejects the count or insert.
pub async fn seed_if_empty(products: &dyn ProductRepository) -> Result<usize, SeedError> {
    let existing = products.count().await?;
    if existing > 0 {
        info!(existing, "product catalog already populated; skipping seed");
        return Ok(0);
    }

    let catalogue = load_catalogue()?;
    products.insert_many(&catalogue).await?;
    info!(inserted = catalogue.len(), "seeded product catalog");
    Ok(catalogue.len())
}
