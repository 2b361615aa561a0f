//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Sign-in upserts key on the unique email column so repeated sign-ins
//! refresh the provider profile without duplicating accounts. The income
//! update sets the income and the onboarding flag in one UPDATE and reports
//! a missed row as `None` so the service can distinguish write failures.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserStoreError};
use crate::domain::{AnnualIncome, Email, SignInProfile, User, UserId};

use super::diesel_error::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserStoreError {
    map_basic_pool_error(error, UserStoreError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserStoreError {
    map_basic_diesel_error(error, UserStoreError::query, UserStoreError::connection)
}

fn row_to_user(row: UserRow) -> Result<User, UserStoreError> {
    row.into_domain().map_err(UserStoreError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn upsert_identity(&self, profile: &SignInProfile) -> Result<User, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: UserRow = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                email: profile.email.as_ref(),
                display_name: profile.display_name.as_deref(),
                avatar_url: profile.avatar_url.as_deref(),
            })
            .on_conflict(users::email)
            .do_update()
            .set((
                users::display_name.eq(excluded(users::display_name)),
                users::avatar_url.eq(excluded(users::avatar_url)),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_user(row)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn set_annual_income(
        &self,
        id: &UserId,
        income: AnnualIncome,
    ) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((
                users::annual_income.eq(Some(income.rupees())),
                users::onboarding_completed.eq(true),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }
}
