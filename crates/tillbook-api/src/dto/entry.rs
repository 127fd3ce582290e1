//! Income and expense DTOs
//!
//! Dates travel as `YYYY-MM-DD` strings and are parsed by the policy crate's
//! calendar-date parser, never as timestamps. Amounts are accepted as JSON
//! numbers or strings and returned as numbers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use tillbook_db::{DbExpense, DbIncome, EntryFilter, EntryScope, IncomeAmounts};
use tillbook_policy::parse_calendar_date;
use tillbook_types::{ExpenseType, Role};

use super::common::{non_negative, not_blank, parse_store_ref};
use crate::error::{ApiError, ApiResult};

// =============================================================================
// Listing
// =============================================================================

/// `GET /income` and `GET /expenses` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub store: Option<String>,
}

impl EntryQuery {
    /// Build a listing filter. The date range only applies when both ends are given.
    pub fn into_filter(self, scope: EntryScope) -> ApiResult<EntryFilter> {
        let mut filter = EntryFilter::new(scope);

        if let (Some(start), Some(end)) = (self.start_date.as_deref(), self.end_date.as_deref()) {
            filter.range = Some((parse_query_date(start)?, parse_query_date(end)?));
        }

        if let Some(store) = self.store.as_deref().filter(|s| !s.trim().is_empty()) {
            filter.store_id = Some(parse_store_ref(store)?);
        }

        Ok(filter)
    }
}

fn parse_query_date(raw: &str) -> ApiResult<NaiveDate> {
    parse_calendar_date(raw).ok_or_else(|| ApiError::BadRequest(format!("Invalid date: {}", raw)))
}

// =============================================================================
// Income
// =============================================================================

/// The five income amounts; missing values count as zero
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IncomeAmountsInput {
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub cash_income: Option<Decimal>,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub pos_income: Option<Decimal>,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub lottery_ticket_income: Option<Decimal>,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub lottery_scratch_income: Option<Decimal>,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub lottery_numerical_income: Option<Decimal>,
}

impl IncomeAmountsInput {
    pub fn amounts(&self) -> IncomeAmounts {
        IncomeAmounts {
            cash: self.cash_income.unwrap_or_default(),
            pos: self.pos_income.unwrap_or_default(),
            lottery_ticket: self.lottery_ticket_income.unwrap_or_default(),
            lottery_scratch: self.lottery_scratch_income.unwrap_or_default(),
            lottery_numerical: self.lottery_numerical_income.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIncomeRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Date and store are required"))]
    pub date: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Date and store are required"))]
    pub store: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub amounts: IncomeAmountsInput,
}

/// Replace the amounts of an income entry, optionally moving it to another store
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateIncomeRequest {
    #[serde(default)]
    pub store: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub amounts: IncomeAmountsInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub store_id: Uuid,
    pub store_name: Option<String>,
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub role: Role,
    #[serde(with = "rust_decimal::serde::float")]
    pub cash_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub pos_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub lottery_ticket_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub lottery_scratch_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub lottery_numerical_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbIncome> for IncomeResponse {
    fn from(entry: DbIncome) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            store_id: entry.store_id,
            store_name: entry.store_name,
            user_id: entry.user_id,
            user_name: entry.user_name,
            role: entry.role,
            cash_income: entry.amounts.cash,
            pos_income: entry.amounts.pos,
            lottery_ticket_income: entry.amounts.lottery_ticket,
            lottery_scratch_income: entry.amounts.lottery_scratch,
            lottery_numerical_income: entry.amounts.lottery_numerical,
            total_income: entry.amounts.total(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeEnvelope {
    pub entry: IncomeResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeListResponse {
    pub entries: Vec<IncomeResponse>,
}

// =============================================================================
// Expenses
// =============================================================================

const EXPENSE_FIELDS_REQUIRED: &str = "Date, description, amount and store are required";

/// Create or replace an expense entry
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExpenseRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Date, description, amount and store are required"))]
    pub date: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Date, description, amount and store are required"))]
    pub description: String,
    #[serde(default)]
    #[validate(
        required(message = "Date, description, amount and store are required"),
        custom(function = "non_negative")
    )]
    pub amount: Option<Decimal>,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Date, description, amount and store are required"))]
    pub store: String,
    #[serde(default, rename = "type")]
    pub expense_type: Option<String>,
}

impl ExpenseRequest {
    pub fn amount(&self) -> ApiResult<Decimal> {
        self.amount
            .ok_or_else(|| ApiError::Validation(EXPENSE_FIELDS_REQUIRED.to_string()))
    }

    /// Parsed `type`. When absent it defaults to `expense` unless `required`.
    pub fn expense_type(&self, required: bool) -> ApiResult<ExpenseType> {
        match self.expense_type.as_deref().map(str::trim) {
            None | Some("") if required => Err(ApiError::Validation(
                "Description, amount, store, and type are required".to_string(),
            )),
            None | Some("") => Ok(ExpenseType::default()),
            Some(raw) => raw.parse().map_err(|_| {
                ApiError::Validation("Type must be either expense or payment".to_string())
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub store_id: Uuid,
    pub store_name: Option<String>,
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbExpense> for ExpenseResponse {
    fn from(entry: DbExpense) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            description: entry.description,
            amount: entry.amount,
            expense_type: entry.expense_type,
            store_id: entry.store_id,
            store_name: entry.store_name,
            user_id: entry.user_id,
            user_name: entry.user_name,
            role: entry.role,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseEnvelope {
    pub entry: ExpenseResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseListResponse {
    pub entries: Vec<ExpenseResponse>,
}
