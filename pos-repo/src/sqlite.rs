//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use pos_types::{
    CashDesk, Employee, Payment, PaymentId, PaymentItem, PaymentRepository, RepoError,
};

use crate::types::{
    DbCashDesk, DbEmployee, DbPayment, DbPaymentItem, DbPaymentState, format_timestamp,
    map_insert_error,
};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &SqlitePool, sql: &str, name: &str) -> anyhow::Result<()> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_tables.sql"),
        "0001",
    )
    .await
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives as long as its connection, so keep exactly one.
        let pool = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePool::connect_with(options).await?
        };

        run_migrations(&pool).await?;
        tracing::debug!("SQLite schema ready");

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn payment_state(&self, id: PaymentId) -> Result<Option<DbPaymentState>, RepoError> {
        sqlx::query_as(r#"SELECT confirmed_at FROM payments WHERE id = ?"#)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }

    /// Explains why a guarded write touched no row.
    async fn guard_rejection(&self, id: PaymentId) -> RepoError {
        match self.payment_state(id).await {
            Ok(None) => RepoError::NotFound,
            Ok(Some(state)) if !state.is_open() => {
                RepoError::Conflict(format!("Payment {} is already confirmed", id))
            }
            Ok(Some(_)) => RepoError::Transaction(format!("Payment {} changed concurrently", id)),
            Err(e) => e,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentRepository for SqliteRepo {
    async fn insert_cash_desk(&self, desk: &CashDesk) -> Result<(), RepoError> {
        sqlx::query(r#"INSERT INTO cash_desks (number) VALUES (?)"#)
            .bind(&desk.number)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, "Cash desk"))?;

        Ok(())
    }

    async fn get_cash_desk(&self, number: &str) -> Result<Option<CashDesk>, RepoError> {
        let row: Option<DbCashDesk> =
            sqlx::query_as(r#"SELECT number FROM cash_desks WHERE number = ?"#)
                .bind(number)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.map(DbCashDesk::into_domain))
    }

    async fn insert_employee(&self, employee: &Employee) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO employees (registration_number, first_name, last_name, role) VALUES (?, ?, ?, ?)"#,
        )
        .bind(&employee.registration_number)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(employee.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "Employee"))?;

        Ok(())
    }

    async fn get_employee(
        &self,
        registration_number: &str,
    ) -> Result<Option<Employee>, RepoError> {
        let row: Option<DbEmployee> = sqlx::query_as(
            r#"SELECT registration_number, first_name, last_name, role FROM employees WHERE registration_number = ?"#,
        )
        .bind(registration_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbEmployee::into_domain).transpose()
    }

    async fn find_open_payment(
        &self,
        cash_desk_number: &str,
    ) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(
            r#"SELECT id, cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at
               FROM payments WHERE cash_desk_number = ? AND confirmed_at IS NULL"#,
        )
        .bind(cash_desk_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (id, cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(payment.id.to_string())
        .bind(&payment.cash_desk_number)
        .bind(&payment.employee_registration_number)
        .bind(payment.payment_type.as_str())
        .bind(format_timestamp(&payment.created_at))
        .bind(payment.confirmed.as_ref().map(format_timestamp))
        .execute(&self.pool)
        .await
        // The partial unique index rejects a second open payment at the desk.
        .map_err(|e| {
            map_insert_error(
                e,
                &format!("An open payment for cash desk {}", payment.cash_desk_number),
            )
        })?;

        Ok(())
    }

    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(
            r#"SELECT id, cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at
               FROM payments WHERE id = ?"#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<DbPayment> = sqlx::query_as(
            r#"SELECT id, cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at
               FROM payments ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPayment::into_domain).collect()
    }

    async fn confirm_payment(
        &self,
        id: PaymentId,
        confirmed_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let result =
            sqlx::query(r#"UPDATE payments SET confirmed_at = ? WHERE id = ? AND confirmed_at IS NULL"#)
                .bind(format_timestamp(&confirmed_at))
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(self.guard_rejection(id).await);
        }

        Ok(())
    }

    async fn insert_payment_item(&self, item: &PaymentItem) -> Result<(), RepoError> {
        // Single statement: the item only lands while the payment is still open.
        let payment_id = item.payment_id.to_string();
        let result = sqlx::query(
            r#"INSERT INTO payment_items (id, payment_id, article_name, amount, price)
               SELECT ?, ?, ?, ?, ?
               WHERE EXISTS (SELECT 1 FROM payments WHERE id = ? AND confirmed_at IS NULL)"#,
        )
        .bind(item.id.to_string())
        .bind(&payment_id)
        .bind(&item.article_name)
        .bind(item.amount)
        .bind(item.price.to_string())
        .bind(&payment_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(self.guard_rejection(item.payment_id).await);
        }

        Ok(())
    }

    async fn list_payment_items(
        &self,
        payment_id: PaymentId,
    ) -> Result<Vec<PaymentItem>, RepoError> {
        let rows: Vec<DbPaymentItem> = sqlx::query_as(
            r#"SELECT id, payment_id, article_name, amount, price
               FROM payment_items WHERE payment_id = ? ORDER BY rowid"#,
        )
        .bind(payment_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPaymentItem::into_domain).collect()
    }

    async fn count_payment_items(&self, payment_id: PaymentId) -> Result<i64, RepoError> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM payment_items WHERE payment_id = ?"#)
            .bind(payment_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }

    async fn delete_payment(&self, id: PaymentId, delete_items: bool) -> Result<bool, RepoError> {
        let id_str = id.to_string();

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        if delete_items {
            sqlx::query(r#"DELETE FROM payment_items WHERE payment_id = ?"#)
                .bind(&id_str)
                .execute(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
        }

        let result = sqlx::query(r#"DELETE FROM payments WHERE id = ?"#)
            .bind(&id_str)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
