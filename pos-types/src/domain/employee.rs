//! Employee domain model.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Capability level of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeRole {
    #[default]
    Staff,
    /// May open credit card payments.
    Manager,
}

impl EmployeeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeRole::Staff => "STAFF",
            EmployeeRole::Manager => "MANAGER",
        }
    }
}

impl std::fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A staff member who can open payments at a cash desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique registration number
    pub registration_number: String,
    pub first_name: String,
    pub last_name: String,
    pub role: EmployeeRole,
}

impl Employee {
    /// Creates an employee.
    ///
    /// # Validation
    /// - Registration number cannot be blank
    pub fn new(
        registration_number: String,
        first_name: String,
        last_name: String,
        role: EmployeeRole,
    ) -> Result<Self, DomainError> {
        if registration_number.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Registration number cannot be empty".into(),
            ));
        }

        Ok(Self {
            registration_number,
            first_name,
            last_name,
            role,
        })
    }

    pub fn is_manager(&self) -> bool {
        self.role == EmployeeRole::Manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_creation() {
        let employee = Employee::new(
            "E1".to_string(),
            "Ada".to_string(),
            "Lovelace".to_string(),
            EmployeeRole::Staff,
        )
        .unwrap();

        assert_eq!(employee.registration_number, "E1");
        assert!(!employee.is_manager());
    }

    #[test]
    fn test_manager_role() {
        let manager = Employee::new(
            "M1".to_string(),
            "Grace".to_string(),
            "Hopper".to_string(),
            EmployeeRole::Manager,
        )
        .unwrap();

        assert!(manager.is_manager());
    }

    #[test]
    fn test_empty_registration_number_fails() {
        let result = Employee::new(
            "".to_string(),
            "A".to_string(),
            "B".to_string(),
            EmployeeRole::Staff,
        );
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }
}
