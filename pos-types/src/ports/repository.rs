//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite) implement this trait.

use chrono::{DateTime, Utc};

use crate::domain::{CashDesk, Employee, Payment, PaymentId, PaymentItem};
use crate::error::RepoError;

/// The store behind the payment service.
///
/// Lookups are by unique key. Every write is atomic, and the guarded writes
/// (`confirm_payment`, `insert_payment_item`) re-check their precondition
/// inside the same statement so concurrent callers cannot slip past the
/// service's own checks.
#[async_trait::async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Reference Data
    // ─────────────────────────────────────────────────────────────────────────────

    /// Stores a cash desk. `Conflict` if the number is taken.
    async fn insert_cash_desk(&self, desk: &CashDesk) -> Result<(), RepoError>;

    /// Gets a cash desk by number.
    async fn get_cash_desk(&self, number: &str) -> Result<Option<CashDesk>, RepoError>;

    /// Stores an employee. `Conflict` if the registration number is taken.
    async fn insert_employee(&self, employee: &Employee) -> Result<(), RepoError>;

    /// Gets an employee by registration number.
    async fn get_employee(&self, registration_number: &str)
    -> Result<Option<Employee>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────────

    /// Finds the unconfirmed payment of a cash desk, if any.
    async fn find_open_payment(&self, cash_desk_number: &str)
    -> Result<Option<Payment>, RepoError>;

    /// Stores a new payment.
    async fn insert_payment(&self, payment: &Payment) -> Result<(), RepoError>;

    /// Gets a payment by ID.
    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    /// Lists all payments, newest first.
    async fn list_payments(&self) -> Result<Vec<Payment>, RepoError>;

    /// Sets the confirmation timestamp of an open payment.
    ///
    /// `NotFound` if the payment is missing, `Conflict` if it is already confirmed.
    async fn confirm_payment(
        &self,
        id: PaymentId,
        confirmed_at: DateTime<Utc>,
    ) -> Result<(), RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Items
    // ─────────────────────────────────────────────────────────────────────────────

    /// Stores an item while its payment is open.
    ///
    /// `NotFound` if the payment is missing, `Conflict` if it is confirmed.
    async fn insert_payment_item(&self, item: &PaymentItem) -> Result<(), RepoError>;

    /// Lists the items of a payment.
    async fn list_payment_items(&self, payment_id: PaymentId)
    -> Result<Vec<PaymentItem>, RepoError>;

    /// Counts the items of a payment.
    async fn count_payment_items(&self, payment_id: PaymentId) -> Result<i64, RepoError>;

    /// Deletes a payment, first deleting its items when `delete_items` is set.
    ///
    /// Runs in one transaction. Returns `false` if the payment did not exist.
    async fn delete_payment(&self, id: PaymentId, delete_items: bool) -> Result<bool, RepoError>;
}
