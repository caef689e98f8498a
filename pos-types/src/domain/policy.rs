//! Deletion policy for payments that still have items.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// What deleting a payment does when the caller did not ask to delete its
/// items but some exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemDeletePolicy {
    /// Reject the deletion with a conflict.
    #[default]
    Forbid,
    /// Remove the items together with the payment.
    Cascade,
}

impl std::str::FromStr for ItemDeletePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forbid" => Ok(ItemDeletePolicy::Forbid),
            "cascade" => Ok(ItemDeletePolicy::Cascade),
            _ => Err(DomainError::ValidationError(format!(
                "Unknown item delete policy: {}",
                s
            ))),
        }
    }
}
