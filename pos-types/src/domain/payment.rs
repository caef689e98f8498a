//! Payment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cash_desk::CashDesk;
use super::employee::Employee;
use crate::error::DomainError;

/// Unique identifier for a Payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Creates a new random PaymentId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PaymentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    Cash,
    Maestro,
    /// Restricted to managers
    CreditCard,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "Cash",
            PaymentType::Maestro => "Maestro",
            PaymentType::CreditCard => "CreditCard",
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the exact variant name; anything else is rejected.
impl std::str::FromStr for PaymentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(PaymentType::Cash),
            "Maestro" => Ok(PaymentType::Maestro),
            "CreditCard" => Ok(PaymentType::CreditCard),
            other => Err(DomainError::InvalidPaymentType(other.to_string())),
        }
    }
}

/// A payment opened at a cash desk.
///
/// A payment is open while `confirmed` is `None`. Once confirmed it is
/// final: the timestamp is never changed and no items can be added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Cash desk the payment was opened at
    pub cash_desk_number: String,
    /// Employee who opened the payment
    pub employee_registration_number: String,
    pub payment_type: PaymentType,
    /// When the payment was opened
    pub created_at: DateTime<Utc>,
    /// When the payment was confirmed (None while open)
    pub confirmed: Option<DateTime<Utc>>,
}

impl Payment {
    /// Opens a new payment at the given desk.
    pub fn open(cash_desk: &CashDesk, employee: &Employee, payment_type: PaymentType) -> Self {
        Self {
            id: PaymentId::new(),
            cash_desk_number: cash_desk.number.clone(),
            employee_registration_number: employee.registration_number.clone(),
            payment_type,
            created_at: Utc::now(),
            confirmed: None,
        }
    }

    /// Reconstructs a payment from database fields.
    pub fn from_parts(
        id: PaymentId,
        cash_desk_number: String,
        employee_registration_number: String,
        payment_type: PaymentType,
        created_at: DateTime<Utc>,
        confirmed: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            cash_desk_number,
            employee_registration_number,
            payment_type,
            created_at,
            confirmed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.confirmed.is_none()
    }

    /// Marks the payment as confirmed at `at`.
    pub fn confirm(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.is_open() {
            return Err(DomainError::PaymentAlreadyConfirmed(self.id));
        }
        self.confirmed = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmployeeRole;

    fn desk_and_employee() -> (CashDesk, Employee) {
        let desk = CashDesk::new("D1".to_string()).unwrap();
        let employee = Employee::new(
            "E1".to_string(),
            "Ada".to_string(),
            "Lovelace".to_string(),
            EmployeeRole::Staff,
        )
        .unwrap();
        (desk, employee)
    }

    #[test]
    fn test_payment_type_parsing() {
        assert_eq!("Cash".parse::<PaymentType>().unwrap(), PaymentType::Cash);
        assert_eq!(
            "CreditCard".parse::<PaymentType>().unwrap(),
            PaymentType::CreditCard
        );
        assert_eq!(
            "Maestro".parse::<PaymentType>().unwrap(),
            PaymentType::Maestro
        );
    }

    #[test]
    fn test_unknown_payment_type_fails() {
        for input in ["", "cash", "Bitcoin", " Cash"] {
            let result = input.parse::<PaymentType>();
            assert!(
                matches!(result, Err(DomainError::InvalidPaymentType(ref s)) if s == input),
                "expected {:?} to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_open_payment() {
        let (desk, employee) = desk_and_employee();
        let payment = Payment::open(&desk, &employee, PaymentType::Cash);

        assert_eq!(payment.cash_desk_number, "D1");
        assert_eq!(payment.employee_registration_number, "E1");
        assert!(payment.is_open());
    }

    #[test]
    fn test_confirm_only_once() {
        let (desk, employee) = desk_and_employee();
        let mut payment = Payment::open(&desk, &employee, PaymentType::Cash);

        let first = Utc::now();
        payment.confirm(first).unwrap();
        assert_eq!(payment.confirmed, Some(first));

        let result = payment.confirm(Utc::now());
        assert!(matches!(result, Err(DomainError::PaymentAlreadyConfirmed(_))));
        assert_eq!(payment.confirmed, Some(first));
    }
}
