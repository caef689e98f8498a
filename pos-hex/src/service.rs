//! Payment Application Service
//!
//! Orchestrates domain operations through the repository port.
//! Contains NO infrastructure logic - pure business orchestration.

use chrono::Utc;

use pos_types::{
    AddPaymentItemRequest, AppError, CashDesk, CreatePaymentRequest, Employee, ItemDeletePolicy,
    Payment, PaymentDetailsResponse, PaymentId, PaymentItem, PaymentRepository, PaymentType,
    RegisterCashDeskRequest, RegisterEmployeeRequest,
};

/// Application service for cash desk payments.
///
/// Generic over `R: PaymentRepository` - the adapter is injected at compile time.
/// This enables:
/// - Swapping repositories without code changes
/// - Testing with in-memory repo
/// - Compile-time checks for port implementation
pub struct PaymentService<R: PaymentRepository> {
    repo: R,
    delete_policy: ItemDeletePolicy,
}

impl<R: PaymentRepository> PaymentService<R> {
    /// Creates a new payment service with the given repository.
    ///
    /// Deleting a payment that still has items is forbidden unless the
    /// caller asks for the items to go too; see [`Self::with_delete_policy`].
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            delete_policy: ItemDeletePolicy::default(),
        }
    }

    /// Sets what `delete_payment(id, false)` does when items exist.
    pub fn with_delete_policy(mut self, policy: ItemDeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn delete_policy(&self) -> ItemDeletePolicy {
        self.delete_policy
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reference Data
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers a cash desk.
    pub async fn register_cash_desk(
        &self,
        req: RegisterCashDeskRequest,
    ) -> Result<CashDesk, AppError> {
        let desk = CashDesk::new(req.number)?;
        self.repo.insert_cash_desk(&desk).await?;

        tracing::info!(cash_desk = %desk.number, "cash desk registered");
        Ok(desk)
    }

    /// Registers an employee.
    pub async fn register_employee(
        &self,
        req: RegisterEmployeeRequest,
    ) -> Result<Employee, AppError> {
        let employee = Employee::new(
            req.registration_number,
            req.first_name,
            req.last_name,
            req.role,
        )?;
        self.repo.insert_employee(&employee).await?;

        tracing::info!(
            employee = %employee.registration_number,
            role = %employee.role,
            "employee registered"
        );
        Ok(employee)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Opens a payment at a cash desk.
    ///
    /// Fails with `NotFound` for an unknown desk or employee, `Conflict` if
    /// the desk already has an open payment, `InvalidArgument` for an unknown
    /// payment type and `Forbidden` if a non-manager asks for a credit card
    /// payment. The checks run in that order.
    pub async fn create_payment(&self, req: CreatePaymentRequest) -> Result<Payment, AppError> {
        let desk = self
            .repo
            .get_cash_desk(&req.cash_desk_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cash desk {}", req.cash_desk_number)))?;

        let employee = self
            .repo
            .get_employee(&req.employee_registration_number)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Employee {}", req.employee_registration_number))
            })?;

        if let Some(open) = self.repo.find_open_payment(&desk.number).await? {
            tracing::warn!(cash_desk = %desk.number, open_payment = %open.id, "desk already has an open payment");
            return Err(AppError::Conflict(format!(
                "An open payment already exists for cash desk {}",
                desk.number
            )));
        }

        let payment_type: PaymentType = req.payment_type.parse()?;

        if payment_type == PaymentType::CreditCard && !employee.is_manager() {
            tracing::warn!(employee = %employee.registration_number, "credit card payment refused");
            return Err(AppError::Forbidden(
                "Only managers can create credit card payments".into(),
            ));
        }

        let payment = Payment::open(&desk, &employee, payment_type);
        self.repo.insert_payment(&payment).await?;

        tracing::info!(
            payment_id = %payment.id,
            cash_desk = %payment.cash_desk_number,
            payment_type = %payment.payment_type,
            "payment opened"
        );
        Ok(payment)
    }

    /// Confirms an open payment and returns it.
    pub async fn confirm_payment(&self, id: PaymentId) -> Result<Payment, AppError> {
        let mut payment = self.get_payment(id).await?;

        let now = Utc::now();
        payment.confirm(now)?;
        self.repo.confirm_payment(id, now).await?;

        tracing::info!(payment_id = %id, "payment confirmed");
        Ok(payment)
    }

    /// Adds a line item to an open payment.
    ///
    /// The item fields are validated before the payment is looked up. An item
    /// that would push the payment total out of range is `InvalidArgument`.
    pub async fn add_payment_item(
        &self,
        req: AddPaymentItemRequest,
    ) -> Result<PaymentItem, AppError> {
        let item = PaymentItem::new(req.article_name, req.amount, req.price, req.payment_id)?;

        let payment = self.get_payment(req.payment_id).await?;
        if !payment.is_open() {
            return Err(AppError::Conflict(
                "Cannot add items to a confirmed payment".into(),
            ));
        }

        let existing = self.repo.list_payment_items(item.payment_id).await?;
        PaymentItem::sum_line_totals(existing.iter().chain(std::iter::once(&item)))?;

        self.repo.insert_payment_item(&item).await?;

        tracing::info!(payment_id = %item.payment_id, item_id = %item.id, "payment item added");
        Ok(item)
    }

    /// Deletes a payment.
    ///
    /// With `delete_items` the payment's items are removed in the same
    /// transaction. Without it, existing items are handled according to the
    /// configured [`ItemDeletePolicy`]. Deleting a missing payment is a no-op.
    pub async fn delete_payment(&self, id: PaymentId, delete_items: bool) -> Result<(), AppError> {
        if self.repo.get_payment(id).await?.is_none() {
            tracing::debug!(payment_id = %id, "delete of missing payment ignored");
            return Ok(());
        }

        let delete_items = delete_items || {
            let item_count = self.repo.count_payment_items(id).await?;
            match (item_count, self.delete_policy) {
                (0, _) => false,
                (_, ItemDeletePolicy::Cascade) => true,
                (_, ItemDeletePolicy::Forbid) => {
                    return Err(AppError::Conflict(format!(
                        "Payment {} still has {} item(s)",
                        id, item_count
                    )));
                }
            }
        };

        self.repo.delete_payment(id, delete_items).await?;

        tracing::info!(payment_id = %id, delete_items, "payment deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets a payment by ID.
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.repo
            .get_payment(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Payment {}", id))))
    }

    /// Lists all payments, newest first.
    pub async fn list_payments(&self) -> Result<Vec<Payment>, AppError> {
        self.repo.list_payments().await.map_err(Into::into)
    }

    /// Lists the items of a payment.
    pub async fn list_payment_items(&self, id: PaymentId) -> Result<Vec<PaymentItem>, AppError> {
        // Verify payment exists first
        let _ = self.get_payment(id).await?;

        self.repo.list_payment_items(id).await.map_err(Into::into)
    }

    /// Gets a payment together with its items.
    pub async fn get_payment_details(
        &self,
        id: PaymentId,
    ) -> Result<PaymentDetailsResponse, AppError> {
        let payment = self.get_payment(id).await?;
        let items = self.repo.list_payment_items(id).await?;
        Ok(PaymentDetailsResponse::new(payment, items)?)
    }
}
