//! Expense splitting: turn one amount into exact per-participant shares.

pub mod method;
pub mod splitter;
