//! Account repository

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use tillbook_types::Role;

use crate::{DbError, DbResult, DbUser};

const USER_COLUMNS: &str =
    "id, role, business_id, name, username, password_hash, created_at, updated_at";

/// Repository for business owner and employee accounts
pub struct UserRepo {
    pool: SqlitePool,
}

impl UserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert(
        &self,
        id: Uuid,
        role: Role,
        business_id: Uuid,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> DbResult<DbUser> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, DbUser>(&format!(
            r#"
            INSERT INTO users (id, role, business_id, name, username, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(role.as_str())
        .bind(business_id)
        .bind(name)
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, || format!("Username {} already exists", username)))?;

        Ok(user)
    }

    /// Register a business. The owner account shares the business id.
    pub async fn create_business(
        &self,
        company_name: &str,
        username: &str,
        password_hash: &str,
    ) -> DbResult<DbUser> {
        let id = Uuid::new_v4();
        self.insert(id, Role::Business, id, company_name, username, password_hash)
            .await
    }

    /// Create an employee account under `business_id`
    pub async fn create_employee(
        &self,
        business_id: Uuid,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> DbResult<DbUser> {
        self.insert(
            Uuid::new_v4(),
            Role::Employee,
            business_id,
            name,
            username,
            password_hash,
        )
        .await
    }

    /// Find account by ID
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find the account to log in as, preferring business accounts
    pub async fn find_for_login(&self, username: &str) -> DbResult<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE username = ?
            ORDER BY CASE role WHEN 'business' THEN 0 ELSE 1 END
            LIMIT 1
            "#
        ))
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Employees of a business, newest first
    pub async fn list_employees(&self, business_id: Uuid) -> DbResult<Vec<DbUser>> {
        let users = sqlx::query_as::<_, DbUser>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE business_id = ? AND role = 'employee'
            ORDER BY created_at DESC
            "#
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Find an employee of `business_id`
    pub async fn find_employee(&self, business_id: Uuid, id: Uuid) -> DbResult<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE id = ? AND business_id = ? AND role = 'employee'
            "#
        ))
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update an employee's name, username and optionally password hash
    pub async fn update_employee(
        &self,
        business_id: Uuid,
        id: Uuid,
        name: &str,
        username: &str,
        password_hash: Option<&str>,
    ) -> DbResult<DbUser> {
        let user = sqlx::query_as::<_, DbUser>(&format!(
            r#"
            UPDATE users
            SET name = ?, username = ?, password_hash = COALESCE(?, password_hash), updated_at = ?
            WHERE id = ? AND business_id = ? AND role = 'employee'
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, || format!("Username {} already exists", username)))?;

        user.ok_or_else(|| DbError::NotFound(format!("Employee {}", id)))
    }

    /// Update account password hash
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("User {}", id)));
        }
        Ok(())
    }

    /// Delete an employee of `business_id`. Returns false if none matched.
    pub async fn delete_employee(&self, business_id: Uuid, id: Uuid) -> DbResult<bool> {
        let result =
            sqlx::query("DELETE FROM users WHERE id = ? AND business_id = ? AND role = 'employee'")
                .bind(id)
                .bind(business_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
