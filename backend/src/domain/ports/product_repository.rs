//! Port abstraction for the loan product catalog store.

use async_trait::async_trait;

use crate::domain::filters::ProductFilters;
use crate::domain::loan::{Product, ProductId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by product repository adapters.
    pub enum ProductStoreError {
        /// Repository connection could not be established.
        Connection => "product store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "product store query failed: {message}",
    }
}

/// Read (and seed-time write) access to the product catalog.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List products matching every supplied filter, ascending by APR.
    async fn list(&self, filters: &ProductFilters) -> Result<Vec<Product>, ProductStoreError>;

    /// Up to `limit` products whose income floor is at most `income`,
    /// ascending by APR.
    async fn shortlist(&self, income: i64, limit: i64) -> Result<Vec<Product>, ProductStoreError>;

    /// Fetch a product by identifier.
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductStoreError>;

    /// Number of catalog records; used to decide whether to seed.
    async fn count(&self) -> Result<i64, ProductStoreError>;

    /// Insert catalog records; used only by seeding.
    async fn insert_many(&self, products: &[Product]) -> Result<(), ProductStoreError>;
}

/// In-memory catalog used by tests and database-less runs.
///
/// Implements the exact filter semantics of the SQL adapter, including the
/// deliberately inverted `min_income`/`max_income` interpretation.
#[derive(Debug, Default)]
pub struct FixtureProductRepository {
    products: std::sync::Mutex<Vec<Product>>,
}

impl FixtureProductRepository {
    /// Construct an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a catalog pre-populated with `products`.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: std::sync::Mutex::new(products),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Product>>, ProductStoreError> {
        self.products
            .lock()
            .map_err(|_| ProductStoreError::connection("fixture catalog lock poisoned"))
    }
}

fn matches(product: &Product, filters: &ProductFilters) -> bool {
    if let Some(bank) = &filters.bank {
        if !product.bank.to_lowercase().contains(&bank.to_lowercase()) {
            return false;
        }
    }
    if filters.min_apr.is_some_and(|min| product.rate_apr < min) {
        return false;
    }
    if filters.max_apr.is_some_and(|max| product.rate_apr > max) {
        return false;
    }
    // Inverted on purpose: min_income upper-bounds the product's income floor.
    if filters.min_income.is_some_and(|cap| product.min_income > cap) {
        return false;
    }
    if filters.max_income.is_some_and(|floor| product.min_income < floor) {
        return false;
    }
    if filters
        .min_credit_score
        .is_some_and(|score| product.min_credit_score < score)
    {
        return false;
    }
    if filters
        .loan_type
        .is_some_and(|loan_type| product.loan_type != loan_type)
    {
        return false;
    }
    true
}

fn sort_by_apr(products: &mut [Product]) {
    products.sort_by(|a, b| a.rate_apr.total_cmp(&b.rate_apr));
}

#[async_trait]
impl ProductRepository for FixtureProductRepository {
    async fn list(&self, filters: &ProductFilters) -> Result<Vec<Product>, ProductStoreError> {
        let mut matching: Vec<Product> = self
            .lock()?
            .iter()
            .filter(|product| matches(product, filters))
            .cloned()
            .collect();
        sort_by_apr(&mut matching);
        Ok(matching)
    }

    async fn shortlist(&self, income: i64, limit: i64) -> Result<Vec<Product>, ProductStoreError> {
        let mut eligible: Vec<Product> = self
            .lock()?
            .iter()
            .filter(|product| product.min_income <= income)
            .cloned()
            .collect();
        sort_by_apr(&mut eligible);
        let capped = usize::try_from(limit).unwrap_or(0);
        eligible.truncate(capped);
        Ok(eligible)
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductStoreError> {
        Ok(self.lock()?.iter().find(|product| &product.id == id).cloned())
    }

    async fn count(&self) -> Result<i64, ProductStoreError> {
        let len = self.lock()?.len();
        i64::try_from(len).map_err(|_| ProductStoreError::query("catalog size overflow"))
    }

    async fn insert_many(&self, products: &[Product]) -> Result<(), ProductStoreError> {
        self.lock()?.extend_from_slice(products);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Filter semantics coverage shared with the SQL adapter's contract.

    use super::*;
    use crate::domain::loan::test_fixtures::{product, product_spec};
    use crate::domain::loan::{LoanType, Product};
    use rstest::rstest;

    fn catalog() -> FixtureProductRepository {
        // Income 400000 must shortlist APR 10 then 12.
        FixtureProductRepository::with_products(vec![
            product("A", 10.0, 300_000),
            product("B", 8.0, 600_000),
            product("C", 12.0, 200_000),
        ])
    }

    #[tokio::test]
    async fn no_filters_return_the_whole_catalog_ascending_by_apr() {
        let repo = catalog();
        let products = repo
            .list(&ProductFilters::default())
            .await
            .expect("list should succeed");
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[tokio::test]
    async fn all_supplied_bounds_apply_conjunctively() {
        let repo = catalog();
        let filters = ProductFilters {
            min_apr: Some(9.0),
            max_apr: Some(12.0),
            min_income: Some(300_000),
            ..ProductFilters::default()
        };
        let products = repo.list(&filters).await.expect("list should succeed");
        for found in &products {
            assert!(found.rate_apr >= 9.0 && found.rate_apr <= 12.0);
            assert!(found.min_income <= 300_000);
        }
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn bank_filter_is_a_case_insensitive_substring() {
        let mut spec = product_spec("D", 9.5, 250_000);
        spec.bank = "State Union Bank".to_owned();
        let other = Product::try_new(spec).expect("valid product");
        let repo = FixtureProductRepository::with_products(vec![product("A", 10.0, 300_000), other]);

        let filters = ProductFilters {
            bank: Some("state union".to_owned()),
            ..ProductFilters::default()
        };
        let products = repo.list(&filters).await.expect("list should succeed");
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["D"]);
    }

    #[tokio::test]
    async fn income_bounds_are_inverted_by_design() {
        let repo = catalog();

        // "Products I qualify for with income <= 400000".
        let qualifying = ProductFilters {
            min_income: Some(400_000),
            ..ProductFilters::default()
        };
        let products = repo.list(&qualifying).await.expect("list should succeed");
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);

        // max_income lower-bounds the product's income floor.
        let floor = ProductFilters {
            max_income: Some(400_000),
            ..ProductFilters::default()
        };
        let products = repo.list(&floor).await.expect("list should succeed");
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B"]);
    }

    #[tokio::test]
    async fn loan_type_filter_is_exact() {
        let mut spec = product_spec("E", 11.0, 100_000);
        spec.loan_type = LoanType::Education;
        let education = Product::try_new(spec).expect("valid product");
        let repo =
            FixtureProductRepository::with_products(vec![product("A", 10.0, 300_000), education]);

        let filters = ProductFilters {
            loan_type: Some(LoanType::Education),
            ..ProductFilters::default()
        };
        let products = repo.list(&filters).await.expect("list should succeed");
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["E"]);
    }

    #[tokio::test]
    async fn shortlist_orders_eligible_products_by_apr() {
        let repo = catalog();
        let shortlist = repo.shortlist(400_000, 5).await.expect("shortlist");
        let rates: Vec<f64> = shortlist.iter().map(|p| p.rate_apr).collect();
        assert_eq!(rates, vec![10.0, 12.0]);
    }

    #[tokio::test]
    async fn shortlist_caps_at_the_limit() {
        let repo = FixtureProductRepository::with_products(
            (0..8)
                .map(|i| product(&format!("P{i}"), 8.0 + f64::from(i), 100_000))
                .collect(),
        );
        let shortlist = repo.shortlist(500_000, 5).await.expect("shortlist");
        assert_eq!(shortlist.len(), 5);
    }

    #[tokio::test]
    async fn shortlist_below_every_floor_is_empty() {
        let repo = catalog();
        let shortlist = repo.shortlist(100_000, 5).await.expect("shortlist");
        assert!(shortlist.is_empty());
    }
}
