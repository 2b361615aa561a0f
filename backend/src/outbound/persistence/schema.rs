//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// User accounts keyed by UUID, unique on email.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique email address, the sign-in upsert key.
        email -> Varchar,
        /// Display name from the identity provider, if any.
        display_name -> Nullable<Varchar>,
        /// Avatar URL from the identity provider, if any.
        avatar_url -> Nullable<Text>,
        /// Declared annual income in rupees, set by onboarding.
        annual_income -> Nullable<Int8>,
        /// Whether the income declaration has happened.
        onboarding_completed -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Loan product catalog.
    loan_products (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Product name.
        name -> Varchar,
        /// Issuing bank.
        bank -> Varchar,
        /// Loan type wire name (personal, education, ...).
        loan_type -> Varchar,
        /// Annual percentage rate.
        rate_apr -> Float8,
        /// Minimum annual income required, in rupees.
        min_income -> Int8,
        /// Minimum credit score required.
        min_credit_score -> Int4,
        /// Shortest tenure offered, in months.
        tenure_min_months -> Int4,
        /// Longest tenure offered, in months.
        tenure_max_months -> Int4,
        /// Processing fee as a percentage of principal.
        processing_fee_pct -> Float8,
        /// Whether early repayment is allowed.
        prepayment_allowed -> Bool,
        /// Disbursal speed wire name (fast, standard, slow).
        disbursal_speed -> Varchar,
        /// Documentation level wire name (low, standard, high).
        docs_level -> Varchar,
        /// Optional one-line summary.
        summary -> Nullable<Text>,
        /// Ordered FAQ entries as a JSON array of q/a pairs.
        faq -> Jsonb,
        /// Free-form terms document.
        terms -> Jsonb,
        /// Catalog insertion timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only advisor conversation turns.
    chat_messages (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Product the conversation is scoped to.
        product_id -> Uuid,
        /// Turn role wire name (user or assistant).
        role -> Varchar,
        /// Turn text.
        content -> Text,
        /// Persistence timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, loan_products, chat_messages);
