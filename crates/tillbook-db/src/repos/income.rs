//! Income entry repository

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use tillbook_types::Principal;

use crate::models::IncomeRow;
use crate::repos::push_entry_filter;
use crate::{DbError, DbIncome, DbResult, EntryFilter, IncomeAmounts, IncomeFields};

const SELECT_INCOME: &str = r#"
    SELECT
        e.id, e.user_id, e.role, e.business_id, e.store_id, e.date,
        e.cash_income, e.pos_income, e.lottery_ticket_income,
        e.lottery_scratch_income, e.lottery_numerical_income,
        e.created_at, e.updated_at,
        s.name AS store_name, u.name AS user_name
    FROM income_entries e
    LEFT JOIN stores s ON s.id = e.store_id
    LEFT JOIN users u ON u.id = e.user_id
"#;

pub struct IncomeRepo {
    pool: SqlitePool,
}

impl IncomeRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner: &Principal, entry: &IncomeFields) -> DbResult<DbIncome> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let amounts = &entry.amounts;

        sqlx::query(
            r#"
            INSERT INTO income_entries (
                id, user_id, role, business_id, store_id, date,
                cash_income, pos_income, lottery_ticket_income,
                lottery_scratch_income, lottery_numerical_income,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(owner.id.0)
        .bind(owner.role.as_str())
        .bind(owner.business_id.0)
        .bind(entry.store_id)
        .bind(entry.date)
        .bind(amounts.cash.to_string())
        .bind(amounts.pos.to_string())
        .bind(amounts.lottery_ticket.to_string())
        .bind(amounts.lottery_scratch.to_string())
        .bind(amounts.lottery_numerical.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, || format!("Store {} does not exist", entry.store_id)))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Income entry {}", id)))
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbIncome>> {
        let row = sqlx::query_as::<_, IncomeRow>(&format!("{SELECT_INCOME} WHERE e.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(IncomeRow::into_model).transpose()
    }

    /// Entries matching `filter`, by date then creation time, newest first
    pub async fn list(&self, filter: &EntryFilter) -> DbResult<Vec<DbIncome>> {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_INCOME);
        push_entry_filter(&mut builder, "e", filter);

        let rows = builder
            .build_query_as::<IncomeRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(IncomeRow::into_model).collect()
    }

    /// Replace the amounts and store of an entry. The date is immutable.
    pub async fn update(
        &self,
        id: Uuid,
        store_id: Uuid,
        amounts: &IncomeAmounts,
    ) -> DbResult<DbIncome> {
        let result = sqlx::query(
            r#"
            UPDATE income_entries
            SET store_id = ?, cash_income = ?, pos_income = ?, lottery_ticket_income = ?,
                lottery_scratch_income = ?, lottery_numerical_income = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(store_id)
        .bind(amounts.cash.to_string())
        .bind(amounts.pos.to_string())
        .bind(amounts.lottery_ticket.to_string())
        .bind(amounts.lottery_scratch.to_string())
        .bind(amounts.lottery_numerical.to_string())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, || format!("Store {} does not exist", store_id)))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Income entry {}", id)));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Income entry {}", id)))
    }

    pub async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM income_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of entries referencing a store
    pub async fn count_by_store(&self, store_id: Uuid) -> DbResult<u64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM income_entries WHERE store_id = ?")
                .bind(store_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }
}
