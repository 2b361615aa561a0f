//! PostgreSQL-backed `ProductRepository` implementation using Diesel ORM.
//!
//! Translates the sparse catalog filter set into one dynamically composed
//! query. The inverted income bound semantics live in the domain contract;
//! this adapter just renders them as SQL comparisons.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProductRepository, ProductStoreError};
use crate::domain::{Product, ProductFilters, ProductId};

use super::diesel_error::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{LoanProductRow, NewLoanProductRow};
use super::pool::{DbPool, PoolError};
use super::schema::loan_products;

/// Diesel-backed implementation of the `ProductRepository` port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProductStoreError {
    map_basic_pool_error(error, ProductStoreError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProductStoreError {
    map_basic_diesel_error(
        error,
        ProductStoreError::query,
        ProductStoreError::connection,
    )
}

fn rows_to_products(rows: Vec<LoanProductRow>) -> Result<Vec<Product>, ProductStoreError> {
    rows.into_iter()
        .map(|row| row.into_domain().map_err(ProductStoreError::query))
        .collect()
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn list(&self, filters: &ProductFilters) -> Result<Vec<Product>, ProductStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = loan_products::table.into_boxed();
        if let Some(bank) = &filters.bank {
            query = query.filter(loan_products::bank.ilike(format!("%{bank}%")));
        }
        if let Some(min_apr) = filters.min_apr {
            query = query.filter(loan_products::rate_apr.ge(min_apr));
        }
        if let Some(max_apr) = filters.max_apr {
            query = query.filter(loan_products::rate_apr.le(max_apr));
        }
        // Income bounds are deliberately inverted; see ProductFilters.
        if let Some(min_income) = filters.min_income {
            query = query.filter(loan_products::min_income.le(min_income));
        }
        if let Some(max_income) = filters.max_income {
            query = query.filter(loan_products::min_income.ge(max_income));
        }
        if let Some(score) = filters.min_credit_score {
            query = query.filter(loan_products::min_credit_score.ge(score));
        }
        if let Some(loan_type) = filters.loan_type {
            query = query.filter(loan_products::loan_type.eq(loan_type.as_str()));
        }

        let rows: Vec<LoanProductRow> = query
            .order(loan_products::rate_apr.asc())
            .select(LoanProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_products(rows)
    }

    async fn shortlist(&self, income: i64, limit: i64) -> Result<Vec<Product>, ProductStoreError> {
        if income <= 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<LoanProductRow> = loan_products::table
            .filter(loan_products::min_income.le(income))
            .order(loan_products::rate_apr.asc())
            .limit(limit)
            .select(LoanProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_products(rows)
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<LoanProductRow> = loan_products::table
            .filter(loan_products::id.eq(id.as_uuid()))
            .select(LoanProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row.into_domain().map_err(ProductStoreError::query))
            .transpose()
    }

    async fn count(&self) -> Result<i64, ProductStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        loan_products::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn insert_many(&self, products: &[Product]) -> Result<(), ProductStoreError> {
        let rows: Vec<NewLoanProductRow> = products
            .iter()
            .map(|product| {
                NewLoanProductRow::from_domain(product).map_err(ProductStoreError::query)
            })
            .collect::<Result<_, _>>()?;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(loan_products::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
