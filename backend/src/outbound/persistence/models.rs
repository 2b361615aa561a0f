//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    ChatMessage, ChatRole, DisbursalSpeed, DocsLevel, Email, Faq, LoanType, Product, ProductId,
    User, UserId,
};

use super::schema::{chat_messages, loan_products, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub annual_income: Option<i64>,
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Rebuild the domain user from a stored row.
    ///
    /// Stored values passed validation on write, so a failure here means the
    /// row was modified out of band; the caller maps it to a query error.
    pub fn into_domain(self) -> Result<User, String> {
        let email = Email::new(&self.email)
            .map_err(|err| format!("stored email failed validation: {err}"))?;
        let annual_income = self
            .annual_income
            .map(crate::domain::AnnualIncome::new)
            .transpose()
            .map_err(|err| format!("stored income failed validation: {err}"))?;
        Ok(User {
            id: UserId::from_uuid(self.id),
            email,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            annual_income,
            onboarding_completed: self.onboarding_completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
}

/// Row struct for reading from the loan_products table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = loan_products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LoanProductRow {
    pub id: Uuid,
    pub name: String,
    pub bank: String,
    pub loan_type: String,
    pub rate_apr: f64,
    pub min_income: i64,
    pub min_credit_score: i32,
    pub tenure_min_months: i32,
    pub tenure_max_months: i32,
    pub processing_fee_pct: f64,
    pub prepayment_allowed: bool,
    pub disbursal_speed: String,
    pub docs_level: String,
    pub summary: Option<String>,
    pub faq: serde_json::Value,
    pub terms: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl LoanProductRow {
    /// Rebuild the domain product from a stored row.
    pub fn into_domain(self) -> Result<Product, String> {
        let loan_type = LoanType::from_str(&self.loan_type)
            .map_err(|err| format!("stored loan type failed validation: {err}"))?;
        let disbursal_speed = DisbursalSpeed::from_str(&self.disbursal_speed)
            .map_err(|err| format!("stored disbursal speed failed validation: {err}"))?;
        let docs_level = DocsLevel::from_str(&self.docs_level)
            .map_err(|err| format!("stored docs level failed validation: {err}"))?;
        let faq: Vec<Faq> = serde_json::from_value(self.faq)
            .map_err(|err| format!("stored faq failed to decode: {err}"))?;
        Ok(Product {
            id: ProductId::from_uuid(self.id),
            name: self.name,
            bank: self.bank,
            loan_type,
            rate_apr: self.rate_apr,
            min_income: self.min_income,
            min_credit_score: self.min_credit_score,
            tenure_min_months: self.tenure_min_months,
            tenure_max_months: self.tenure_max_months,
            processing_fee_pct: self.processing_fee_pct,
            prepayment_allowed: self.prepayment_allowed,
            disbursal_speed,
            docs_level,
            summary: self.summary,
            faq,
            terms: self.terms,
            created_at: self.created_at,
        })
    }
}

/// Insertable struct for creating new loan product records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = loan_products)]
pub(crate) struct NewLoanProductRow {
    pub id: Uuid,
    pub name: String,
    pub bank: String,
    pub loan_type: String,
    pub rate_apr: f64,
    pub min_income: i64,
    pub min_credit_score: i32,
    pub tenure_min_months: i32,
    pub tenure_max_months: i32,
    pub processing_fee_pct: f64,
    pub prepayment_allowed: bool,
    pub disbursal_speed: String,
    pub docs_level: String,
    pub summary: Option<String>,
    pub faq: serde_json::Value,
    pub terms: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl NewLoanProductRow {
    /// Flatten a validated domain product for insertion.
    pub fn from_domain(product: &Product) -> Result<Self, String> {
        let faq = serde_json::to_value(&product.faq)
            .map_err(|err| format!("faq failed to serialise: {err}"))?;
        Ok(Self {
            id: *product.id.as_uuid(),
            name: product.name.clone(),
            bank: product.bank.clone(),
            loan_type: product.loan_type.as_str().to_owned(),
            rate_apr: product.rate_apr,
            min_income: product.min_income,
            min_credit_score: product.min_credit_score,
            tenure_min_months: product.tenure_min_months,
            tenure_max_months: product.tenure_max_months,
            processing_fee_pct: product.processing_fee_pct,
            prepayment_allowed: product.prepayment_allowed,
            disbursal_speed: product.disbursal_speed.as_str().to_owned(),
            docs_level: product.docs_level.as_str().to_owned(),
            summary: product.summary.clone(),
            faq,
            terms: product.terms.clone(),
            created_at: product.created_at,
        })
    }
}

/// Row struct for reading from the chat_messages table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = chat_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChatMessageRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessageRow {
    /// Rebuild the domain message from a stored row.
    pub fn into_domain(self) -> Result<ChatMessage, String> {
        let role = ChatRole::from_str(&self.role)
            .map_err(|err| format!("stored chat role failed validation: {err}"))?;
        Ok(ChatMessage {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            product_id: ProductId::from_uuid(self.product_id),
            role,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

/// Insertable struct for appending conversation turns.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chat_messages)]
pub(crate) struct NewChatMessageRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub role: &'a str,
    pub content: &'a str,
}
