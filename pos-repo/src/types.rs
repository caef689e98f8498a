//! Shared database types with feature-gated fields for SQLite and PostgreSQL.
//!
//! SQLite stores UUIDs, timestamps and prices as TEXT; PostgreSQL uses its
//! native `UUID`, `TIMESTAMPTZ` and `NUMERIC` columns.

use sqlx::FromRow;

use pos_types::{
    CashDesk, Employee, EmployeeRole, Payment, PaymentId, PaymentItem, PaymentItemId,
    PaymentType, RepoError,
};

// ─────────────────────────────────────────────────────────────────────────────
// Feature-gated imports
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(not(feature = "sqlite"))]
use chrono::{DateTime, Utc};
#[cfg(not(feature = "sqlite"))]
use rust_decimal::Decimal;
#[cfg(not(feature = "sqlite"))]
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Cash desk row from database.
#[derive(FromRow)]
pub struct DbCashDesk {
    pub number: String,
}

/// Employee row from database.
#[derive(FromRow)]
pub struct DbEmployee {
    pub registration_number: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

/// Payment row from database.
#[derive(FromRow)]
pub struct DbPayment {
    #[cfg(not(feature = "sqlite"))]
    pub id: Uuid,
    #[cfg(feature = "sqlite")]
    pub id: String,

    pub cash_desk_number: String,
    pub employee_registration_number: String,
    pub payment_type: String,

    #[cfg(not(feature = "sqlite"))]
    pub created_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub created_at: String,

    #[cfg(not(feature = "sqlite"))]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[cfg(feature = "sqlite")]
    pub confirmed_at: Option<String>,
}

/// Payment item row from database.
#[derive(FromRow)]
pub struct DbPaymentItem {
    #[cfg(not(feature = "sqlite"))]
    pub id: Uuid,
    #[cfg(feature = "sqlite")]
    pub id: String,

    #[cfg(not(feature = "sqlite"))]
    pub payment_id: Uuid,
    #[cfg(feature = "sqlite")]
    pub payment_id: String,

    pub article_name: String,
    pub amount: i32,

    #[cfg(not(feature = "sqlite"))]
    pub price: Decimal,
    #[cfg(feature = "sqlite")]
    pub price: String,
}

/// Confirmation state of a payment, used by guarded writes.
#[derive(FromRow)]
pub struct DbPaymentState {
    #[cfg(not(feature = "sqlite"))]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[cfg(feature = "sqlite")]
    pub confirmed_at: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn parse_payment_type(s: &str) -> Result<PaymentType, RepoError> {
    s.parse()
        .map_err(|_| RepoError::Database(format!("Unknown payment type: {}", s)))
}

pub fn parse_role(s: &str) -> Result<EmployeeRole, RepoError> {
    match s {
        "STAFF" => Ok(EmployeeRole::Staff),
        "MANAGER" => Ok(EmployeeRole::Manager),
        _ => Err(RepoError::Database(format!("Unknown employee role: {}", s))),
    }
}

/// Maps a sqlx error, turning unique-key violations into `Conflict`.
pub fn map_insert_error(err: sqlx::Error, what: &str) -> RepoError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(format!("{} already exists", what))
        }
        _ => RepoError::Database(err.to_string()),
    }
}

#[cfg(feature = "sqlite")]
pub fn format_timestamp(dt: &chrono::DateTime<chrono::Utc>) -> String {
    // Fixed width so that TEXT ordering matches time ordering.
    dt.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

#[cfg(feature = "sqlite")]
fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, RepoError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| RepoError::Database(e.to_string()))
}

#[cfg(feature = "sqlite")]
fn parse_uuid(s: &str) -> Result<uuid::Uuid, RepoError> {
    uuid::Uuid::parse_str(s).map_err(|e| RepoError::Database(e.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion (feature-gated implementations)
// ─────────────────────────────────────────────────────────────────────────────

impl DbCashDesk {
    pub fn into_domain(self) -> CashDesk {
        CashDesk {
            number: self.number,
        }
    }
}

impl DbEmployee {
    pub fn into_domain(self) -> Result<Employee, RepoError> {
        Ok(Employee {
            registration_number: self.registration_number,
            first_name: self.first_name,
            last_name: self.last_name,
            role: parse_role(&self.role)?,
        })
    }
}

impl DbPayment {
    /// Convert database row to domain Payment.
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        let payment_type = parse_payment_type(&self.payment_type)?;

        #[cfg(not(feature = "sqlite"))]
        let (id, created_at, confirmed) = (
            PaymentId::from_uuid(self.id),
            self.created_at,
            self.confirmed_at,
        );

        #[cfg(feature = "sqlite")]
        let (id, created_at, confirmed) = (
            PaymentId::from_uuid(parse_uuid(&self.id)?),
            parse_timestamp(&self.created_at)?,
            self.confirmed_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
        );

        Ok(Payment::from_parts(
            id,
            self.cash_desk_number,
            self.employee_registration_number,
            payment_type,
            created_at,
            confirmed,
        ))
    }
}

impl DbPaymentItem {
    /// Convert database row to domain PaymentItem.
    pub fn into_domain(self) -> Result<PaymentItem, RepoError> {
        #[cfg(not(feature = "sqlite"))]
        let (id, payment_id, price) = (
            PaymentItemId::from_uuid(self.id),
            PaymentId::from_uuid(self.payment_id),
            self.price,
        );

        #[cfg(feature = "sqlite")]
        let (id, payment_id, price) = {
            let price = self
                .price
                .parse::<rust_decimal::Decimal>()
                .map_err(|e| RepoError::Database(e.to_string()))?;
            (
                PaymentItemId::from_uuid(parse_uuid(&self.id)?),
                PaymentId::from_uuid(parse_uuid(&self.payment_id)?),
                price,
            )
        };

        Ok(PaymentItem::from_parts(
            id,
            payment_id,
            self.article_name,
            self.amount,
            price,
        ))
    }
}

impl DbPaymentState {
    pub fn is_open(&self) -> bool {
        self.confirmed_at.is_none()
    }
}
