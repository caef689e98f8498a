//! Payment line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payment::PaymentId;
use crate::error::DomainError;

/// Longest article name accepted, in characters.
pub const MAX_ARTICLE_NAME_LEN: usize = 100;

/// Unique identifier for a PaymentItem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentItemId(Uuid);

impl PaymentItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for PaymentItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single line of a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentItem {
    pub id: PaymentItemId,
    pub payment_id: PaymentId,
    pub article_name: String,
    /// Number of units, at least 1
    pub amount: i32,
    /// Unit price, strictly positive
    pub price: Decimal,
}

impl PaymentItem {
    /// Creates a new item for the given payment.
    ///
    /// # Validation
    /// - Article name cannot be blank or longer than 100 characters
    /// - Amount must be at least 1
    /// - Price must be greater than zero
    pub fn new(
        article_name: String,
        amount: i32,
        price: Decimal,
        payment_id: PaymentId,
    ) -> Result<Self, DomainError> {
        Self::validate(&article_name, amount, price)?;

        Ok(Self {
            id: PaymentItemId::new(),
            payment_id,
            article_name,
            amount,
            price,
        })
    }

    /// Checks the field constraints without building an item.
    pub fn validate(article_name: &str, amount: i32, price: Decimal) -> Result<(), DomainError> {
        if article_name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "The article name is required".into(),
            ));
        }
        if article_name.chars().count() > MAX_ARTICLE_NAME_LEN {
            return Err(DomainError::ValidationError(format!(
                "The article name must not exceed {} characters",
                MAX_ARTICLE_NAME_LEN
            )));
        }
        if amount < 1 {
            return Err(DomainError::ValidationError(
                "The amount must be at least 1".into(),
            ));
        }
        if price <= Decimal::ZERO {
            return Err(DomainError::ValidationError(
                "The price must be greater than zero".into(),
            ));
        }
        if price.checked_mul(Decimal::from(amount)).is_none() {
            return Err(DomainError::ValidationError(
                "The price times amount is out of range".into(),
            ));
        }
        Ok(())
    }

    /// Reconstructs an item from database fields.
    pub fn from_parts(
        id: PaymentItemId,
        payment_id: PaymentId,
        article_name: String,
        amount: i32,
        price: Decimal,
    ) -> Self {
        Self {
            id,
            payment_id,
            article_name,
            amount,
            price,
        }
    }

    /// Price times amount, `None` on overflow.
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.amount))
    }

    /// Sums the line totals of `items`.
    pub fn sum_line_totals<'a>(
        items: impl IntoIterator<Item = &'a PaymentItem>,
    ) -> Result<Decimal, DomainError> {
        items.into_iter().try_fold(Decimal::ZERO, |total, item| {
            item.line_total()
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| {
                    DomainError::ValidationError("The payment total is out of range".into())
                })
        })
    }
}
