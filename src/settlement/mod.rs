//! Debt repayment against an external value-transfer service.

pub mod processor;
pub mod token;
pub mod transfer;
