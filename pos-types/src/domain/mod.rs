//! Domain models for the payment service.

pub mod cash_desk;
pub mod employee;
pub mod payment;
pub mod payment_item;
pub mod policy;

pub use cash_desk::CashDesk;
pub use employee::{Employee, EmployeeRole};
pub use payment::{Payment, PaymentId, PaymentType};
pub use payment_item::{PaymentItem, PaymentItemId};
pub use policy::ItemDeletePolicy;
