//! Database models - mapped from SQLite tables
//!
//! Amounts are stored as decimal TEXT and parsed on the way out.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use tillbook_types::{BusinessId, ExpenseType, Principal, Role, UserId};

use crate::error::{DbError, DbResult};

fn parse_amount(column: &str, raw: &str) -> DbResult<Decimal> {
    Decimal::from_str(raw).map_err(|e| DbError::Corrupt(format!("{column}: {e}")))
}

fn parse_role(raw: &str) -> DbResult<Role> {
    raw.parse().map_err(|e| DbError::Corrupt(format!("role: {e}")))
}

// ============================================================================
// Accounts
// ============================================================================

/// Business owner or employee account
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbUser {
    pub id: Uuid,
    pub role: String,
    pub business_id: Uuid,
    /// Company name for business accounts, person name for employees
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbUser {
    pub fn role(&self) -> DbResult<Role> {
        parse_role(&self.role)
    }

    pub fn principal(&self) -> DbResult<Principal> {
        Ok(Principal::new(
            UserId::from_uuid(self.id),
            self.role()?,
            BusinessId::from_uuid(self.business_id),
        ))
    }
}

// ============================================================================
// Stores
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbStore {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Entries
// ============================================================================

/// The five income amounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeAmounts {
    pub cash: Decimal,
    pub pos: Decimal,
    pub lottery_ticket: Decimal,
    pub lottery_scratch: Decimal,
    pub lottery_numerical: Decimal,
}

impl IncomeAmounts {
    pub fn total(&self) -> Decimal {
        self.cash + self.pos + self.lottery_ticket + self.lottery_scratch + self.lottery_numerical
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct IncomeRow {
    id: Uuid,
    user_id: Uuid,
    role: String,
    business_id: Uuid,
    store_id: Uuid,
    date: NaiveDate,
    cash_income: String,
    pos_income: String,
    lottery_ticket_income: String,
    lottery_scratch_income: String,
    lottery_numerical_income: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    store_name: Option<String>,
    user_name: Option<String>,
}

/// Income entry with the owning user's and store's names resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbIncome {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub business_id: Uuid,
    pub store_id: Uuid,
    pub date: NaiveDate,
    pub amounts: IncomeAmounts,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub store_name: Option<String>,
    pub user_name: Option<String>,
}

impl IncomeRow {
    pub(crate) fn into_model(self) -> DbResult<DbIncome> {
        Ok(DbIncome {
            id: self.id,
            user_id: self.user_id,
            role: parse_role(&self.role)?,
            business_id: self.business_id,
            store_id: self.store_id,
            date: self.date,
            amounts: IncomeAmounts {
                cash: parse_amount("cash_income", &self.cash_income)?,
                pos: parse_amount("pos_income", &self.pos_income)?,
                lottery_ticket: parse_amount("lottery_ticket_income", &self.lottery_ticket_income)?,
                lottery_scratch: parse_amount(
                    "lottery_scratch_income",
                    &self.lottery_scratch_income,
                )?,
                lottery_numerical: parse_amount(
                    "lottery_numerical_income",
                    &self.lottery_numerical_income,
                )?,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
            store_name: self.store_name,
            user_name: self.user_name,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct ExpenseRow {
    id: Uuid,
    user_id: Uuid,
    role: String,
    business_id: Uuid,
    store_id: Uuid,
    date: NaiveDate,
    description: String,
    amount: String,
    expense_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    store_name: Option<String>,
    user_name: Option<String>,
}

/// Expense entry with the owning user's and store's names resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbExpense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub business_id: Uuid,
    pub store_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub expense_type: ExpenseType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub store_name: Option<String>,
    pub user_name: Option<String>,
}

impl ExpenseRow {
    pub(crate) fn into_model(self) -> DbResult<DbExpense> {
        Ok(DbExpense {
            id: self.id,
            user_id: self.user_id,
            role: parse_role(&self.role)?,
            business_id: self.business_id,
            store_id: self.store_id,
            date: self.date,
            description: self.description,
            amount: parse_amount("amount", &self.amount)?,
            expense_type: self
                .expense_type
                .parse()
                .map_err(|e| DbError::Corrupt(format!("expense_type: {e}")))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            store_name: self.store_name,
            user_name: self.user_name,
        })
    }
}

/// Fields for a new income entry
#[derive(Debug, Clone)]
pub struct IncomeFields {
    pub store_id: Uuid,
    pub date: NaiveDate,
    pub amounts: IncomeAmounts,
}

/// Fields for a new or replaced expense entry
#[derive(Debug, Clone)]
pub struct ExpenseFields {
    pub store_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub expense_type: ExpenseType,
}

/// Which owner's or business's entries a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryScope {
    Owner(Uuid),
    Business(Uuid),
}

/// Listing filter for income and expense entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryFilter {
    pub scope: EntryScope,
    /// Inclusive date range
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub store_id: Option<Uuid>,
}

impl EntryFilter {
    pub fn new(scope: EntryScope) -> Self {
        Self {
            scope,
            range: None,
            store_id: None,
        }
    }
}
