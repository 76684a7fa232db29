pub mod debt_graph;
pub mod debt_ledger;
