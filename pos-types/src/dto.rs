//! Command objects and responses for the service and API boundaries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{EmployeeRole, Payment, PaymentId, PaymentItem};
use crate::error::DomainError;

// ─────────────────────────────────────────────────────────────────────────────
// Reference data DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to register a cash desk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCashDeskRequest {
    pub number: String,
}

/// Request to register an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterEmployeeRequest {
    pub registration_number: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: EmployeeRole,
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to open a payment at a cash desk.
///
/// `payment_type` is free text and is parsed by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub cash_desk_number: String,
    pub employee_registration_number: String,
    pub payment_type: String,
}

/// Request to add a line item to an open payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPaymentItemRequest {
    pub article_name: String,
    pub amount: i32,
    pub price: Decimal,
    pub payment_id: PaymentId,
}

/// Item body posted to `/api/payments/{id}/items`; the payment comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPaymentItem {
    pub article_name: String,
    pub amount: i32,
    pub price: Decimal,
}

impl NewPaymentItem {
    pub fn for_payment(self, payment_id: PaymentId) -> AddPaymentItemRequest {
        AddPaymentItemRequest {
            article_name: self.article_name,
            amount: self.amount,
            price: self.price,
            payment_id,
        }
    }
}

/// Query string of the delete endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeletePaymentQuery {
    #[serde(default)]
    pub delete_items: bool,
}

/// A payment together with its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetailsResponse {
    #[serde(flatten)]
    pub payment: Payment,
    pub items: Vec<PaymentItem>,
    /// Sum of all line totals
    pub total: Decimal,
}

impl PaymentDetailsResponse {
    /// Fails if the total does not fit a `Decimal`.
    pub fn new(payment: Payment, items: Vec<PaymentItem>) -> Result<Self, DomainError> {
        let total = PaymentItem::sum_line_totals(&items)?;
        Ok(Self {
            payment,
            items,
            total,
        })
    }
}
