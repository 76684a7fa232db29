//! Group creation and the join-request state machine.

pub mod manager;
