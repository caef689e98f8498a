//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pos_types::{
    CashDesk, Employee, Payment, PaymentId, PaymentItem, PaymentRepository, RepoError,
};

use crate::types::{
    DbCashDesk, DbEmployee, DbPayment, DbPaymentItem, DbPaymentState, map_insert_error,
};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository with row-level locking.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
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

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_tables_pg.sql"),
        "0001",
    )
    .await
}

const PAYMENT_COLUMNS: &str =
    "id, cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at";

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        tracing::debug!("PostgreSQL schema ready");
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentRepository for PostgresRepo {
    async fn insert_cash_desk(&self, desk: &CashDesk) -> Result<(), RepoError> {
        sqlx::query(r#"INSERT INTO cash_desks (number) VALUES ($1)"#)
            .bind(&desk.number)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, "Cash desk"))?;

        Ok(())
    }

    async fn get_cash_desk(&self, number: &str) -> Result<Option<CashDesk>, RepoError> {
        let row: Option<DbCashDesk> =
            sqlx::query_as(r#"SELECT number FROM cash_desks WHERE number = $1"#)
                .bind(number)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.map(DbCashDesk::into_domain))
    }

    async fn insert_employee(&self, employee: &Employee) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO employees (registration_number, first_name, last_name, role) VALUES ($1, $2, $3, $4)"#,
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
            r#"SELECT registration_number, first_name, last_name, role FROM employees WHERE registration_number = $1"#,
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
        let sql = format!(
            "SELECT {} FROM payments WHERE cash_desk_number = $1 AND confirmed_at IS NULL",
            PAYMENT_COLUMNS
        );
        let row: Option<DbPayment> = sqlx::query_as(&sql)
            .bind(cash_desk_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (id, cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(payment.id.into_uuid())
        .bind(&payment.cash_desk_number)
        .bind(&payment.employee_registration_number)
        .bind(payment.payment_type.as_str())
        .bind(payment.created_at)
        .bind(payment.confirmed)
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
        let sql = format!("SELECT {} FROM payments WHERE id = $1", PAYMENT_COLUMNS);
        let row: Option<DbPayment> = sqlx::query_as(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, RepoError> {
        let sql = format!(
            "SELECT {} FROM payments ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        );
        let rows: Vec<DbPayment> = sqlx::query_as(&sql)
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
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        // Lock the payment row with FOR UPDATE
        let state: Option<DbPaymentState> =
            sqlx::query_as(r#"SELECT confirmed_at FROM payments WHERE id = $1 FOR UPDATE"#)
                .bind(id.into_uuid())
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        let state = state.ok_or(RepoError::NotFound)?;
        if !state.is_open() {
            return Err(RepoError::Conflict(format!(
                "Payment {} is already confirmed",
                id
            )));
        }

        sqlx::query(r#"UPDATE payments SET confirmed_at = $1 WHERE id = $2"#)
            .bind(confirmed_at)
            .bind(id.into_uuid())
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn insert_payment_item(&self, item: &PaymentItem) -> Result<(), RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        // Confirmation waits for this transaction while the row is locked.
        let state: Option<DbPaymentState> =
            sqlx::query_as(r#"SELECT confirmed_at FROM payments WHERE id = $1 FOR UPDATE"#)
                .bind(item.payment_id.into_uuid())
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        let state = state.ok_or(RepoError::NotFound)?;
        if !state.is_open() {
            return Err(RepoError::Conflict(format!(
                "Payment {} is already confirmed",
                item.payment_id
            )));
        }

        sqlx::query(
            r#"INSERT INTO payment_items (id, payment_id, article_name, amount, price) VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(item.id.into_uuid())
        .bind(item.payment_id.into_uuid())
        .bind(&item.article_name)
        .bind(item.amount)
        .bind(item.price)
        .execute(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn list_payment_items(
        &self,
        payment_id: PaymentId,
    ) -> Result<Vec<PaymentItem>, RepoError> {
        let rows: Vec<DbPaymentItem> = sqlx::query_as(
            r#"SELECT id, payment_id, article_name, amount, price
               FROM payment_items WHERE payment_id = $1 ORDER BY seq"#,
        )
        .bind(payment_id.into_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPaymentItem::into_domain).collect()
    }

    async fn count_payment_items(&self, payment_id: PaymentId) -> Result<i64, RepoError> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM payment_items WHERE payment_id = $1"#)
            .bind(payment_id.into_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }

    async fn delete_payment(&self, id: PaymentId, delete_items: bool) -> Result<bool, RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        if delete_items {
            sqlx::query(r#"DELETE FROM payment_items WHERE payment_id = $1"#)
                .bind(id.into_uuid())
                .execute(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
        }

        let result = sqlx::query(r#"DELETE FROM payments WHERE id = $1"#)
            .bind(id.into_uuid())
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
