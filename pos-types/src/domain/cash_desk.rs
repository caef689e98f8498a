//! Cash desk reference data.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A physical cash desk, identified by its number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashDesk {
    pub number: String,
}

impl CashDesk {
    /// Creates a cash desk.
    ///
    /// # Validation
    /// - Number cannot be blank
    pub fn new(number: String) -> Result<Self, DomainError> {
        if number.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Cash desk number cannot be empty".into(),
            ));
        }

        Ok(Self { number })
    }
}
