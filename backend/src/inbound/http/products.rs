//! Loan catalog endpoints.
//!
//! ```text
//! GET /api/products?bank=&minApr=&maxApr=&minIncome=&maxIncome=&minCreditScore=&type=
//! GET /api/products/recommended
//! ```

use std::str::FromStr;

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    DisbursalSpeed, DocsLevel, Error, Faq, FilterValidationError, LoanType, Product, ProductFilters,
    ProductId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Wire representation of one loan product.
///
/// Field names follow the persisted catalog schema, including `type` for the
/// loan type.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDto {
    /// Stable product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Issuing bank.
    pub bank: String,
    /// Loan type.
    #[serde(rename = "type")]
    pub loan_type: LoanType,
    /// Annual percentage rate.
    pub rate_apr: f64,
    /// Minimum annual income required, in rupees.
    pub min_income: i64,
    /// Minimum credit score required.
    pub min_credit_score: i32,
    /// Shortest tenure offered, in months.
    pub tenure_min_months: i32,
    /// Longest tenure offered, in months.
    pub tenure_max_months: i32,
    /// Processing fee as a percentage of principal.
    pub processing_fee_pct: f64,
    /// Whether early repayment is allowed.
    pub prepayment_allowed: bool,
    /// How quickly funds are disbursed.
    pub disbursal_speed: DisbursalSpeed,
    /// Documentation burden.
    pub docs_level: DocsLevel,
    /// Optional one-line summary.
    pub summary: Option<String>,
    /// Ordered frequently-asked questions.
    pub faq: Vec<Faq>,
    /// Free-form terms document.
    #[schema(value_type = Object)]
    pub terms: serde_json::Value,
    /// Catalog insertion time.
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            bank: product.bank,
            loan_type: product.loan_type,
            rate_apr: product.rate_apr,
            min_income: product.min_income,
            min_credit_score: product.min_credit_score,
            tenure_min_months: product.tenure_min_months,
            tenure_max_months: product.tenure_max_months,
            processing_fee_pct: product.processing_fee_pct,
            prepayment_allowed: product.prepayment_allowed,
            disbursal_speed: product.disbursal_speed,
            docs_level: product.docs_level,
            summary: product.summary,
            faq: product.faq,
            terms: product.terms,
            created_at: product.created_at,
        }
    }
}

/// Response envelope for catalog listings.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductsResponse {
    /// Matching products, ascending by APR.
    pub products: Vec<ProductDto>,
}

impl ProductsResponse {
    fn from_products(products: Vec<Product>) -> Self {
        Self {
            products: products.into_iter().map(ProductDto::from).collect(),
        }
    }
}

/// Raw query parameters for `GET /api/products`.
///
/// Every field arrives as text; parsing and bounds checks happen in
/// [`parse_filters`] so malformed values produce a structured 400 instead of
/// a framework rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsQuery {
    /// Case-insensitive substring match on the bank name.
    pub bank: Option<String>,
    /// Inclusive lower APR bound.
    pub min_apr: Option<String>,
    /// Inclusive upper APR bound.
    pub max_apr: Option<String>,
    /// Upper bound on the product's required minimum income.
    pub min_income: Option<String>,
    /// Lower bound on the product's required minimum income.
    pub max_income: Option<String>,
    /// Lower bound on the product's required credit score.
    pub min_credit_score: Option<String>,
    /// Exact loan type.
    #[serde(rename = "type")]
    pub loan_type: Option<String>,
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_numeric<T: FromStr>(
    raw: Option<String>,
    field: &'static str,
) -> Result<Option<T>, Error> {
    non_blank(raw)
        .map(|value| {
            value.parse::<T>().map_err(|_| {
                Error::invalid_request(format!("{field} must be a number"))
                    .with_details(json!({ "field": field, "value": value }))
            })
        })
        .transpose()
}

fn parse_loan_type(raw: Option<String>) -> Result<Option<LoanType>, Error> {
    non_blank(raw)
        .map(|value| {
            LoanType::from_str(&value).map_err(|_| {
                Error::invalid_request("type must be a known loan type")
                    .with_details(json!({ "field": "type", "value": value }))
            })
        })
        .transpose()
}

fn map_filter_validation_error(err: FilterValidationError) -> Error {
    let field = err.field();
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Parse and validate the raw catalog query into domain filters.
pub fn parse_filters(query: ProductsQuery) -> Result<ProductFilters, Error> {
    let filters = ProductFilters {
        bank: non_blank(query.bank),
        min_apr: parse_numeric(query.min_apr, "minApr")?,
        max_apr: parse_numeric(query.max_apr, "maxApr")?,
        min_income: parse_numeric(query.min_income, "minIncome")?,
        max_income: parse_numeric(query.max_income, "maxIncome")?,
        min_credit_score: parse_numeric(query.min_credit_score, "minCreditScore")?,
        loan_type: parse_loan_type(query.loan_type)?,
    };
    filters.validate().map_err(map_filter_validation_error)?;
    Ok(filters)
}

/// List catalog products matching every supplied filter.
#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("bank" = Option<String>, Query, description = "Case-insensitive substring match on the bank name"),
        ("minApr" = Option<f64>, Query, description = "Inclusive lower APR bound (0-100)"),
        ("maxApr" = Option<f64>, Query, description = "Inclusive upper APR bound (0-100)"),
        ("minIncome" = Option<i64>, Query, description = "Upper bound on the product's required minimum income"),
        ("maxIncome" = Option<i64>, Query, description = "Lower bound on the product's required minimum income"),
        ("minCreditScore" = Option<i32>, Query, description = "Lower bound on the product's required credit score (300-900)"),
        ("type" = Option<String>, Query, description = "Exact loan type"),
    ),
    responses(
        (status = 200, description = "Matching products, ascending by APR", body = ProductsResponse),
        (status = 400, description = "Invalid filter value", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Catalog store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["products"],
    operation_id = "listProducts"
)]
#[get("/products")]
pub async fn list_products(
    session: SessionContext,
    state: web::Data<HttpState>,
    query: web::Query<ProductsQuery>,
) -> ApiResult<web::Json<ProductsResponse>> {
    session.require_user_id()?;
    let filters = parse_filters(query.into_inner())?;
    let products = state.catalogue.browse(&filters).await?;
    Ok(web::Json(ProductsResponse::from_products(products)))
}

/// Rank the cheapest products the caller's declared income qualifies for.
#[utoipa::path(
    get,
    path = "/api/products/recommended",
    responses(
        (status = 200, description = "Up to five qualifying products, ascending by APR", body = ProductsResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Onboarding incomplete", body = Error),
        (status = 503, description = "Catalog store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["products"],
    operation_id = "recommendedProducts"
)]
#[get("/products/recommended")]
pub async fn recommended_products(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<ProductsResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.onboarding.profile(&user_id).await?;
    if !user.onboarding_completed {
        return Err(Error::forbidden("declare your annual income first"));
    }
    let products = state.catalogue.shortlist(user.annual_income).await?;
    Ok(web::Json(ProductsResponse::from_products(products)))
}
