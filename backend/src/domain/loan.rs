//! Loan product catalog entities.
//!
//! Products are immutable catalog records: created by seeding, never mutated
//! by the application. Construction goes through [`Product::try_new`] so the
//! tenure-range and FAQ-shape invariants hold at the boundary where records
//! are accepted, not only in the store's declared constraints.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed set of loan product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    /// Unsecured personal loan.
    Personal,
    /// Education loan.
    Education,
    /// Vehicle loan.
    Vehicle,
    /// Home loan.
    Home,
    /// Revolving credit line.
    CreditLine,
    /// Debt consolidation loan.
    DebtConsolidation,
}

impl LoanType {
    /// Wire name used in JSON and in the product store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Education => "education",
            Self::Vehicle => "vehicle",
            Self::Home => "home",
            Self::CreditLine => "credit_line",
            Self::DebtConsolidation => "debt_consolidation",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LoanType {
    type Err = ProductValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(Self::Personal),
            "education" => Ok(Self::Education),
            "vehicle" => Ok(Self::Vehicle),
            "home" => Ok(Self::Home),
            "credit_line" => Ok(Self::CreditLine),
            "debt_consolidation" => Ok(Self::DebtConsolidation),
            other => Err(ProductValidationError::UnknownLoanType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Qualitative bucket for funds-release latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisbursalSpeed {
    /// Funds released within a day or two.
    Fast,
    /// Typical processing time.
    Standard,
    /// Manual review, slow release.
    Slow,
}

impl DisbursalSpeed {
    /// Wire name used in JSON and in the product store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Standard => "standard",
            Self::Slow => "slow",
        }
    }
}

impl fmt::Display for DisbursalSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DisbursalSpeed {
    type Err = ProductValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(Self::Fast),
            "standard" => Ok(Self::Standard),
            "slow" => Ok(Self::Slow),
            other => Err(ProductValidationError::UnknownDisbursalSpeed {
                value: other.to_owned(),
            }),
        }
    }
}

/// Qualitative bucket for documentation burden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocsLevel {
    /// Minimal paperwork.
    Low,
    /// Typical paperwork.
    Standard,
    /// Extensive paperwork.
    High,
}

impl DocsLevel {
    /// Wire name used in JSON and in the product store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Standard => "standard",
            Self::High => "high",
        }
    }
}

impl fmt::Display for DocsLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocsLevel {
    type Err = ProductValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "standard" => Ok(Self::Standard),
            "high" => Ok(Self::High),
            other => Err(ProductValidationError::UnknownDocsLevel {
                value: other.to_owned(),
            }),
        }
    }
}

/// One frequently-asked question and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Faq {
    /// The question text (wire name `q`).
    #[serde(rename = "q")]
    pub question: String,
    /// The answer text (wire name `a`).
    #[serde(rename = "a")]
    pub answer: String,
}

/// Stable product identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(Uuid, String);

// `derive(ToSchema)` cannot express `value_type = String, format = Uuid` on a
// two-field tuple struct, so the equivalent schema is written by hand.
impl utoipa::PartialSchema for ProductId {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        utoipa::openapi::schema::ObjectBuilder::new()
            .schema_type(utoipa::openapi::schema::Type::String)
            .format(Some(utoipa::openapi::schema::SchemaFormat::KnownFormat(
                utoipa::openapi::schema::KnownFormat::Uuid,
            )))
            .into()
    }
}

impl ToSchema for ProductId {}

impl ProductId {
    /// Validate and construct a [`ProductId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ProductValidationError> {
        let raw = id.as_ref();
        let parsed =
            Uuid::parse_str(raw).map_err(|_| ProductValidationError::InvalidId)?;
        if raw.trim() != raw {
            return Err(ProductValidationError::InvalidId);
        }
        Ok(Self(parsed, raw.to_owned()))
    }

    /// Generate a new random [`ProductId`].
    #[must_use]
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ProductId> for String {
    fn from(value: ProductId) -> Self {
        let ProductId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for ProductId {
    type Error = ProductValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validation errors raised when accepting a product record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductValidationError {
    /// The product id was not a UUID.
    #[error("product id must be a valid UUID")]
    InvalidId,
    /// The name or bank was blank.
    #[error("product {field} must not be blank")]
    BlankField {
        /// Which field was blank.
        field: &'static str,
    },
    /// The loan type string was not in the closed set.
    #[error("unknown loan type: {value}")]
    UnknownLoanType {
        /// The rejected value.
        value: String,
    },
    /// The disbursal speed string was not in the closed set.
    #[error("unknown disbursal speed: {value}")]
    UnknownDisbursalSpeed {
        /// The rejected value.
        value: String,
    },
    /// The docs level string was not in the closed set.
    #[error("unknown docs level: {value}")]
    UnknownDocsLevel {
        /// The rejected value.
        value: String,
    },
    /// The APR was negative or not finite.
    #[error("rate_apr must be a finite, non-negative percentage")]
    InvalidApr,
    /// The minimum income requirement was negative.
    #[error("min_income must not be negative")]
    NegativeMinIncome,
    /// The tenure range was inverted.
    #[error("tenure_min_months ({min}) must not exceed tenure_max_months ({max})")]
    TenureRangeInverted {
        /// Lower bound that was supplied.
        min: i32,
        /// Upper bound that was supplied.
        max: i32,
    },
    /// A FAQ entry had a blank question or answer.
    #[error("faq entry {index} must have a non-blank question and answer")]
    BlankFaqEntry {
        /// Zero-based index of the offending entry.
        index: usize,
    },
}

/// Immutable loan product catalog record.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Stable identifier.
    pub id: ProductId,
    /// Marketing name.
    pub name: String,
    /// Issuing bank.
    pub bank: String,
    /// Product category.
    pub loan_type: LoanType,
    /// Annual percentage rate, as a percentage.
    pub rate_apr: f64,
    /// Minimum annual income required, in rupees.
    pub min_income: i64,
    /// Minimum credit score required.
    pub min_credit_score: i32,
    /// Shortest allowed repayment duration, in months.
    pub tenure_min_months: i32,
    /// Longest allowed repayment duration, in months.
    pub tenure_max_months: i32,
    /// Processing fee, as a percentage of principal.
    pub processing_fee_pct: f64,
    /// Whether early repayment is allowed.
    pub prepayment_allowed: bool,
    /// Funds-release latency bucket.
    pub disbursal_speed: DisbursalSpeed,
    /// Documentation burden bucket.
    pub docs_level: DocsLevel,
    /// Free-text summary.
    pub summary: Option<String>,
    /// Ordered FAQ pairs.
    pub faq: Vec<Faq>,
    /// Free-form terms document.
    pub terms: Value,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Field bundle for [`Product::try_new`]; keeps the constructor signature flat.
#[derive(Debug, Clone)]
pub struct ProductSpec {
    /// Stable identifier.
    pub id: ProductId,
    /// Marketing name.
    pub name: String,
    /// Issuing bank.
    pub bank: String,
    /// Product category.
    pub loan_type: LoanType,
    /// Annual percentage rate.
    pub rate_apr: f64,
    /// Minimum annual income required, in rupees.
    pub min_income: i64,
    /// Minimum credit score required.
    pub min_credit_score: i32,
    /// Shortest allowed repayment duration, in months.
    pub tenure_min_months: i32,
    /// Longest allowed repayment duration, in months.
    pub tenure_max_months: i32,
    /// Processing fee percentage.
    pub processing_fee_pct: f64,
    /// Whether early repayment is allowed.
    pub prepayment_allowed: bool,
    /// Funds-release latency bucket.
    pub disbursal_speed: DisbursalSpeed,
    /// Documentation burden bucket.
    pub docs_level: DocsLevel,
    /// Free-text summary.
    pub summary: Option<String>,
    /// Ordered FAQ pairs.
    pub faq: Vec<Faq>,
    /// Free-form terms document.
    pub terms: Value,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Accept a product record, enforcing the catalog invariants.
    pub fn try_new(spec: ProductSpec) -> Result<Self, ProductValidationError> {
        if spec.name.trim().is_empty() {
            return Err(ProductValidationError::BlankField { field: "name" });
        }
        if spec.bank.trim().is_empty() {
            return Err(ProductValidationError::BlankField { field: "bank" });
        }
        if !spec.rate_apr.is_finite() || spec.rate_apr < 0.0 {
            return Err(ProductValidationError::InvalidApr);
        }
        if spec.min_income < 0 {
            return Err(ProductValidationError::NegativeMinIncome);
        }
        if spec.tenure_min_months > spec.tenure_max_months {
            return Err(ProductValidationError::TenureRangeInverted {
                min: spec.tenure_min_months,
                max: spec.tenure_max_months,
            });
        }
        for (index, entry) in spec.faq.iter().enumerate() {
            if entry.question.trim().is_empty() || entry.answer.trim().is_empty() {
                return Err(ProductValidationError::BlankFaqEntry { index });
            }
        }

        Ok(Self {
            id: spec.id,
            name: spec.name,
            bank: spec.bank,
            loan_type: spec.loan_type,
            rate_apr: spec.rate_apr,
            min_income: spec.min_income,
            min_credit_score: spec.min_credit_score,
            tenure_min_months: spec.tenure_min_months,
            tenure_max_months: spec.tenure_max_months,
            processing_fee_pct: spec.processing_fee_pct,
            prepayment_allowed: spec.prepayment_allowed,
            disbursal_speed: spec.disbursal_speed,
            docs_level: spec.docs_level,
            summary: spec.summary,
            faq: spec.faq,
            terms: spec.terms,
            created_at: spec.created_at,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    //! Shared product builders for unit tests.

    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    /// Build a valid product spec with overridable APR and income floor.
    pub fn product_spec(name: &str, rate_apr: f64, min_income: i64) -> ProductSpec {
        ProductSpec {
            id: ProductId::random(),
            name: name.to_owned(),
            bank: "Meridian Bank".to_owned(),
            loan_type: LoanType::Personal,
            rate_apr,
            min_income,
            min_credit_score: 700,
            tenure_min_months: 6,
            tenure_max_months: 60,
            processing_fee_pct: 1.0,
            prepayment_allowed: true,
            disbursal_speed: DisbursalSpeed::Standard,
            docs_level: DocsLevel::Standard,
            summary: None,
            faq: Vec::new(),
            terms: json!({}),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().expect("fixed timestamp"),
        }
    }

    /// Build a valid product with overridable APR and income floor.
    pub fn product(name: &str, rate_apr: f64, min_income: i64) -> Product {
        Product::try_new(product_spec(name, rate_apr, min_income)).expect("valid fixture product")
    }
}

#[cfg(test)]
mod tests {
    //! Boundary validation coverage for catalog records.

    use super::test_fixtures::product_spec;
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn accepts_a_well_formed_record() {
        let product = Product::try_new(product_spec("Flexi Personal Loan", 10.5, 300_000));
        assert!(product.is_ok());
    }

    #[rstest]
    fn rejects_inverted_tenure_range() {
        let mut spec = product_spec("Flexi Personal Loan", 10.5, 300_000);
        spec.tenure_min_months = 48;
        spec.tenure_max_months = 12;
        assert_eq!(
            Product::try_new(spec),
            Err(ProductValidationError::TenureRangeInverted { min: 48, max: 12 })
        );
    }

    #[rstest]
    #[case("", "An answer")]
    #[case("A question?", "  ")]
    fn rejects_blank_faq_entries(#[case] question: &str, #[case] answer: &str) {
        let mut spec = product_spec("Flexi Personal Loan", 10.5, 300_000);
        spec.faq = vec![Faq {
            question: question.to_owned(),
            answer: answer.to_owned(),
        }];
        assert_eq!(
            Product::try_new(spec),
            Err(ProductValidationError::BlankFaqEntry { index: 0 })
        );
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(-0.5)]
    fn rejects_invalid_apr(#[case] rate: f64) {
        let mut spec = product_spec("Flexi Personal Loan", 10.5, 300_000);
        spec.rate_apr = rate;
        assert_eq!(Product::try_new(spec), Err(ProductValidationError::InvalidApr));
    }

    #[rstest]
    fn faq_serialises_with_short_wire_names() {
        let entry = Faq {
            question: "Can I prepay?".to_owned(),
            answer: "Yes, after six months.".to_owned(),
        };
        let value = serde_json::to_value(&entry).expect("serialise faq");
        assert_eq!(value.get("q").and_then(|v| v.as_str()), Some("Can I prepay?"));
        assert_eq!(
            value.get("a").and_then(|v| v.as_str()),
            Some("Yes, after six months.")
        );
    }

    #[rstest]
    #[case("credit_line", LoanType::CreditLine)]
    #[case("debt_consolidation", LoanType::DebtConsolidation)]
    fn loan_type_round_trips_wire_names(#[case] raw: &str, #[case] expected: LoanType) {
        let parsed: LoanType = raw.parse().expect("known loan type");
        assert_eq!(parsed, expected);
        assert_eq!(parsed.as_str(), raw);
    }

    #[rstest]
    fn loan_type_rejects_unknown_values() {
        let err = "payday".parse::<LoanType>().expect_err("unknown type");
        assert_eq!(
            err,
            ProductValidationError::UnknownLoanType {
                value: "payday".to_owned()
            }
        );
    }
}
