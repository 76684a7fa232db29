//! The engine's public entry point: a registry of groups behind per-group locks.

pub mod ledger_service;
pub mod registry;
