//! Catalog filter set and its bounds validation.

use crate::domain::loan::LoanType;

/// Bounds accepted for APR filters, as percentages.
pub const APR_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;
/// Bounds accepted for credit score filters.
pub const CREDIT_SCORE_RANGE: std::ops::RangeInclusive<i32> = 300..=900;

/// Sparse set of optional catalog filters, combined with AND semantics.
///
/// The income fields are inverted relative to their names on purpose:
/// `min_income` upper-bounds the product's required minimum income
/// ("products I qualify for given income ≤ X") and `max_income`
/// lower-bounds it. This is surprising but load-bearing for the dashboard,
/// so it is preserved exactly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductFilters {
    /// Case-insensitive substring match on the issuing bank.
    pub bank: Option<String>,
    /// Inclusive lower bound on the product APR.
    pub min_apr: Option<f64>,
    /// Inclusive upper bound on the product APR.
    pub max_apr: Option<f64>,
    /// Upper bound on the product's required minimum income (see above).
    pub min_income: Option<i64>,
    /// Lower bound on the product's required minimum income (see above).
    pub max_income: Option<i64>,
    /// Lower bound on the product's required credit score.
    pub min_credit_score: Option<i32>,
    /// Exact loan type match.
    pub loan_type: Option<LoanType>,
}

/// Validation errors for filter values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterValidationError {
    /// An APR bound fell outside [`APR_RANGE`].
    #[error("{field} must be between 0 and 100")]
    AprOutOfRange {
        /// The offending field name.
        field: &'static str,
    },
    /// An income bound was negative.
    #[error("{field} must not be negative")]
    NegativeIncome {
        /// The offending field name.
        field: &'static str,
    },
    /// The credit score bound fell outside [`CREDIT_SCORE_RANGE`].
    #[error("minCreditScore must be between 300 and 900")]
    CreditScoreOutOfRange,
}

impl FilterValidationError {
    /// Wire name of the query parameter that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::AprOutOfRange { field } | Self::NegativeIncome { field } => field,
            Self::CreditScoreOutOfRange => "minCreditScore",
        }
    }
}

impl ProductFilters {
    /// Validate the supplied bounds.
    ///
    /// Absent fields impose no constraint and are always valid.
    pub fn validate(&self) -> Result<(), FilterValidationError> {
        check_apr(self.min_apr, "minApr")?;
        check_apr(self.max_apr, "maxApr")?;
        check_income(self.min_income, "minIncome")?;
        check_income(self.max_income, "maxIncome")?;
        if let Some(score) = self.min_credit_score {
            if !CREDIT_SCORE_RANGE.contains(&score) {
                return Err(FilterValidationError::CreditScoreOutOfRange);
            }
        }
        Ok(())
    }

    /// Whether any field is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bank.is_none()
            && self.min_apr.is_none()
            && self.max_apr.is_none()
            && self.min_income.is_none()
            && self.max_income.is_none()
            && self.min_credit_score.is_none()
            && self.loan_type.is_none()
    }
}

fn check_apr(value: Option<f64>, field: &'static str) -> Result<(), FilterValidationError> {
    match value {
        Some(apr) if !apr.is_finite() || !APR_RANGE.contains(&apr) => {
            Err(FilterValidationError::AprOutOfRange { field })
        }
        _ => Ok(()),
    }
}

fn check_income(value: Option<i64>, field: &'static str) -> Result<(), FilterValidationError> {
    match value {
        Some(income) if income < 0 => Err(FilterValidationError::NegativeIncome { field }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    //! Bounds coverage mirroring the original request schema.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_filters_are_valid() {
        assert_eq!(ProductFilters::default().validate(), Ok(()));
        assert!(ProductFilters::default().is_empty());
    }

    #[rstest]
    #[case(Some(-0.1), "minApr")]
    #[case(Some(100.5), "minApr")]
    #[case(Some(f64::NAN), "minApr")]
    fn rejects_apr_out_of_range(#[case] min_apr: Option<f64>, #[case] field: &'static str) {
        let filters = ProductFilters {
            min_apr,
            ..ProductFilters::default()
        };
        assert_eq!(
            filters.validate(),
            Err(FilterValidationError::AprOutOfRange { field })
        );
    }

    #[rstest]
    fn rejects_negative_income_bounds() {
        let filters = ProductFilters {
            max_income: Some(-1),
            ..ProductFilters::default()
        };
        let err = filters.validate().expect_err("negative income");
        assert_eq!(err.field(), "maxIncome");
    }

    #[rstest]
    #[case(299, false)]
    #[case(300, true)]
    #[case(900, true)]
    #[case(901, false)]
    fn credit_score_bounds_are_inclusive(#[case] score: i32, #[case] ok: bool) {
        let filters = ProductFilters {
            min_credit_score: Some(score),
            ..ProductFilters::default()
        };
        assert_eq!(filters.validate().is_ok(), ok);
    }

    #[rstest]
    fn boundary_apr_values_are_accepted() {
        let filters = ProductFilters {
            min_apr: Some(0.0),
            max_apr: Some(100.0),
            ..ProductFilters::default()
        };
        assert_eq!(filters.validate(), Ok(()));
    }
}
