pub mod amount;
pub mod error;
pub mod event;
pub mod expense;
pub mod group;
pub mod member;
pub mod settlement;
