//! # POS Types
//!
//! Domain types and port traits for the cash desk payment service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CashDesk, Employee, Payment, PaymentItem)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Command objects for the service and API boundaries
//! - `error/` - Domain, repository and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CashDesk, Employee, EmployeeRole, ItemDeletePolicy, Payment, PaymentId, PaymentItem,
    PaymentItemId, PaymentType,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::PaymentRepository;
