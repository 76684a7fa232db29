//! # group-ledger
//!
//! Shared-expense accounting for groups.
//!
//! Members register expenses split among some of the group, the ledger
//! tracks who owes whom with pairwise netting, a greedy simplifier collapses
//! the debt table into fewer transfers, and settlements repay debt through an
//! external token service.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: members, groups, expenses, settlements, events, errors
//! - **split** — Split methods and the expense splitter
//! - **ledger** — Balances and the netted pairwise debt table
//! - **optimization** — Debt simplification
//! - **membership** — Group creation and join requests
//! - **settlement** — Value-transfer boundary and settlement processing
//! - **service** — Group registry and the ledger service with per-group locking
//! - **simulation** — Scenario replay and random workload generation

pub mod config;
pub mod core;
pub mod ledger;
pub mod membership;
pub mod optimization;
pub mod service;
pub mod settlement;
pub mod simulation;
pub mod split;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::core::amount::{Amount, Balance};
    pub use crate::core::error::{LedgerError, LedgerResult};
    pub use crate::core::group::{GroupId, GroupView};
    pub use crate::core::member::MemberId;
    pub use crate::ledger::debt_graph::DebtEdge;
    pub use crate::optimization::simplifier::{DebtSimplifier, SimplificationReport};
    pub use crate::service::ledger_service::LedgerService;
    pub use crate::settlement::token::InMemoryToken;
    pub use crate::settlement::transfer::{TransferError, ValueTransfer};
    pub use crate::split::method::{SplitKind, SplitMethod};
}
