//! Expense entry repository

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use tillbook_types::Principal;

use crate::models::ExpenseRow;
use crate::repos::push_entry_filter;
use crate::{DbError, DbExpense, DbResult, EntryFilter, ExpenseFields};

const SELECT_EXPENSE: &str = r#"
    SELECT
        e.id, e.user_id, e.role, e.business_id, e.store_id, e.date,
        e.description, e.amount, e.expense_type,
        e.created_at, e.updated_at,
        s.name AS store_name, u.name AS user_name
    FROM expense_entries e
    LEFT JOIN stores s ON s.id = e.store_id
    LEFT JOIN users u ON u.id = e.user_id
"#;

pub struct ExpenseRepo {
    pool: SqlitePool,
}

impl ExpenseRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner: &Principal, fields: &ExpenseFields) -> DbResult<DbExpense> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO expense_entries (
                id, user_id, role, business_id, store_id, date,
                description, amount, expense_type, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(owner.id.0)
        .bind(owner.role.as_str())
        .bind(owner.business_id.0)
        .bind(fields.store_id)
        .bind(fields.date)
        .bind(fields.description.as_str())
        .bind(fields.amount.to_string())
        .bind(fields.expense_type.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, || format!("Store {} does not exist", fields.store_id)))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Expense {}", id)))
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbExpense>> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!("{SELECT_EXPENSE} WHERE e.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ExpenseRow::into_model).transpose()
    }

    /// Entries matching `filter`, by date then creation time, newest first
    pub async fn list(&self, filter: &EntryFilter) -> DbResult<Vec<DbExpense>> {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_EXPENSE);
        push_entry_filter(&mut builder, "e", filter);

        let rows = builder
            .build_query_as::<ExpenseRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ExpenseRow::into_model).collect()
    }

    /// Replace every editable field, including the date
    pub async fn update(&self, id: Uuid, fields: &ExpenseFields) -> DbResult<DbExpense> {
        let result = sqlx::query(
            r#"
            UPDATE expense_entries
            SET store_id = ?, date = ?, description = ?, amount = ?, expense_type = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(fields.store_id)
        .bind(fields.date)
        .bind(fields.description.as_str())
        .bind(fields.amount.to_string())
        .bind(fields.expense_type.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, || format!("Store {} does not exist", fields.store_id)))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Expense {}", id)));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Expense {}", id)))
    }

    pub async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM expense_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of expenses referencing a store
    pub async fn count_by_store(&self, store_id: Uuid) -> DbResult<u64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM expense_entries WHERE store_id = ?")
                .bind(store_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, EntryScope};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tillbook_types::{BusinessId, ExpenseType, UserId};

    fn fields(store_id: Uuid, d: u32, expense_type: ExpenseType) -> ExpenseFields {
        ExpenseFields {
            store_id,
            date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
            description: "Ice delivery".to_string(),
            amount: Decimal::new(4599, 2),
            expense_type,
        }
    }

    #[tokio::test]
    async fn test_expense_crud() {
        let db = Database::in_memory().await.unwrap();
        let owner_row = db
            .user_repo()
            .create_business("Acme", "acme", "h")
            .await
            .unwrap();
        let business_id = BusinessId::from_uuid(owner_row.business_id);
        let alice_row = db
            .user_repo()
            .create_employee(business_id.0, "Alice", "alice", "h")
            .await
            .unwrap();
        let alice = Principal::employee(UserId::from_uuid(alice_row.id), business_id);
        let store = db.store_repo().create(business_id.0, "Main").await.unwrap();
        let repo = db.expense_repo();

        let created = repo
            .create(&alice, &fields(store.id, 10, ExpenseType::Expense))
            .await
            .unwrap();
        assert_eq!(created.amount, Decimal::new(4599, 2));
        assert_eq!(created.expense_type, ExpenseType::Expense);
        assert_eq!(created.user_name.as_deref(), Some("Alice"));

        repo.create(&alice, &fields(store.id, 12, ExpenseType::Payment))
            .await
            .unwrap();
        assert_eq!(repo.count_by_store(store.id).await.unwrap(), 2);

        let updated = repo
            .update(created.id, &fields(store.id, 14, ExpenseType::Payment))
            .await
            .unwrap();
        assert_eq!(updated.date, NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());
        assert_eq!(updated.expense_type, ExpenseType::Payment);

        let listed = repo
            .list(&EntryFilter::new(EntryScope::Owner(alice.id.0)))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, created.id);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_store_is_a_constraint_error() {
        let db = Database::in_memory().await.unwrap();
        let owner = Principal::business_owner(BusinessId::new());

        let err = db
            .expense_repo()
            .create(&owner, &fields(Uuid::new_v4(), 10, ExpenseType::Expense))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));
    }
}
