use crate::core::amount::{total_as_balance, Amount, Balance};
use crate::core::member::MemberId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One directed debt: `debtor` owes `creditor` `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebtEdge {
    pub debtor: MemberId,
    pub creditor: MemberId,
    pub amount: Amount,
}

impl DebtEdge {
    pub fn new(debtor: MemberId, creditor: MemberId, amount: Amount) -> Self {
        Self {
            debtor,
            creditor,
            amount,
        }
    }
}

impl fmt::Display for DebtEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}: {}", self.debtor, self.creditor, self.amount)
    }
}

/// Read-only view of a debt table as a directed graph.
///
/// Edges with the same `(debtor, creditor)` are aggregated. The graph is a
/// view: it is built from a ledger or from simplifier output, and never
/// feeds balances back into the ledger.
///
/// # Examples
///
/// ```
/// use group_ledger::ledger::debt_graph::{DebtEdge, DebtGraph};
///
/// let graph = DebtGraph::from_edges(vec![
///     DebtEdge::new("bob".into(), "dave".into(), 4),
///     DebtEdge::new("bob".into(), "alice".into(), 5),
/// ]);
///
/// assert_eq!(graph.member_count(), 3);
/// assert_eq!(graph.edge_count(), 2);
/// assert_eq!(graph.implied_balance(&"bob".into()), -9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DebtGraph {
    /// (debtor, creditor) -> total amount
    edges: HashMap<(MemberId, MemberId), Amount>,
    /// Every member touching at least one edge
    members: HashSet<MemberId>,
}

impl DebtGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges(edges: impl IntoIterator<Item = DebtEdge>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    /// Add an edge, merging it with an existing edge of the same direction.
    /// Zero-amount edges are ignored.
    pub fn add_edge(&mut self, edge: DebtEdge) {
        if edge.amount == 0 {
            return;
        }
        self.members.insert(edge.debtor.clone());
        self.members.insert(edge.creditor.clone());
        *self.edges.entry((edge.debtor, edge.creditor)).or_insert(0) += edge.amount;
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Sum of every edge amount.
    pub fn gross_total(&self) -> Amount {
        self.edges.values().sum()
    }

    pub fn edge_amount(&self, debtor: &MemberId, creditor: &MemberId) -> Amount {
        self.edges
            .get(&(debtor.clone(), creditor.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// All edges, sorted by debtor then creditor identity.
    pub fn edges(&self) -> Vec<DebtEdge> {
        let mut edges: Vec<DebtEdge> = self
            .edges
            .iter()
            .map(|((d, c), &amt)| DebtEdge::new(d.clone(), c.clone(), amt))
            .collect();
        edges.sort_by(|a, b| (&a.debtor, &a.creditor).cmp(&(&b.debtor, &b.creditor)));
        edges
    }

    /// All edges, sorted by the position of debtor then creditor in `order`.
    /// Members missing from `order` sort last, by identity.
    pub fn edges_in_order(&self, order: &[MemberId]) -> Vec<DebtEdge> {
        let rank = |m: &MemberId| order.iter().position(|o| o == m).unwrap_or(usize::MAX);
        let mut edges = self.edges();
        edges.sort_by(|a, b| {
            (rank(&a.debtor), rank(&a.creditor), &a.debtor, &a.creditor).cmp(&(
                rank(&b.debtor),
                rank(&b.creditor),
                &b.debtor,
                &b.creditor,
            ))
        });
        edges
    }

    /// Creditors `member` owes, with amounts.
    pub fn outgoing(&self, member: &MemberId) -> Vec<(&MemberId, Amount)> {
        self.edges
            .iter()
            .filter(|((d, _), _)| d == member)
            .map(|((_, creditor), &amt)| (creditor, amt))
            .collect()
    }

    /// Debtors owing `member`, with amounts.
    pub fn incoming(&self, member: &MemberId) -> Vec<(&MemberId, Amount)> {
        self.edges
            .iter()
            .filter(|((_, c), _)| c == member)
            .map(|((debtor, _), &amt)| (debtor, amt))
            .collect()
    }

    /// Net position the edges alone give `member`: incoming minus outgoing.
    pub fn implied_balance(&self, member: &MemberId) -> Balance {
        let incoming: Balance = self
            .incoming(member)
            .iter()
            .map(|(_, a)| total_as_balance(*a))
            .sum();
        let outgoing: Balance = self
            .outgoing(member)
            .iter()
            .map(|(_, a)| total_as_balance(*a))
            .sum();
        incoming - outgoing
    }

    /// Net position of every member touching an edge.
    pub fn implied_balances(&self) -> HashMap<MemberId, Balance> {
        let mut balances: HashMap<MemberId, Balance> = HashMap::new();
        for ((debtor, creditor), &amount) in &self.edges {
            *balances.entry(debtor.clone()).or_insert(0) -= total_as_balance(amount);
            *balances.entry(creditor.clone()).or_insert(0) += total_as_balance(amount);
        }
        balances
    }

    /// True when no pair of members has debts in both directions.
    pub fn is_pairwise_netted(&self) -> bool {
        self.edges
            .keys()
            .all(|(d, c)| d != c && !self.edges.contains_key(&(c.clone(), d.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> MemberId {
        MemberId::new(s)
    }

    #[test]
    fn test_graph_basic() {
        let graph = DebtGraph::from_edges(vec![
            DebtEdge::new(m("alice"), m("bob"), 10),
            DebtEdge::new(m("bob"), m("charlie"), 20),
        ]);
        assert_eq!(graph.member_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.gross_total(), 30);
    }

    #[test]
    fn test_edge_aggregation() {
        let graph = DebtGraph::from_edges(vec![
            DebtEdge::new(m("alice"), m("bob"), 10),
            DebtEdge::new(m("alice"), m("bob"), 5),
            DebtEdge::new(m("alice"), m("carol"), 0),
        ]);
        assert_eq!(graph.edge_amount(&m("alice"), &m("bob")), 15);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_implied_balances_sum_to_zero() {
        let graph = DebtGraph::from_edges(vec![
            DebtEdge::new(m("a"), m("b"), 5),
            DebtEdge::new(m("b"), m("c"), 5),
            DebtEdge::new(m("c"), m("a"), 10),
        ]);
        let balances = graph.implied_balances();
        assert_eq!(balances[&m("a")], 5);
        assert_eq!(balances[&m("b")], 0);
        assert_eq!(balances[&m("c")], -5);
        assert_eq!(balances.values().sum::<Balance>(), 0);
    }

    #[test]
    fn test_implied_balance_of_debt_above_single_expense_limit() {
        use crate::core::amount::MAX_AMOUNT;

        let graph = DebtGraph::from_edges(vec![
            DebtEdge::new(m("bob"), m("alice"), MAX_AMOUNT),
            DebtEdge::new(m("bob"), m("alice"), MAX_AMOUNT),
        ]);
        let expected = (2 * MAX_AMOUNT) as Balance;
        assert_eq!(graph.implied_balance(&m("alice")), expected);
        assert_eq!(graph.implied_balance(&m("bob")), -expected);
        assert_eq!(graph.implied_balances()[&m("alice")], expected);
    }

    #[test]
    fn test_edges_in_member_order() {
        let graph = DebtGraph::from_edges(vec![
            DebtEdge::new(m("bob"), m("charlie"), 1),
            DebtEdge::new(m("dave"), m("alice"), 7),
            DebtEdge::new(m("dave"), m("charlie"), 1),
        ]);
        let order = [m("dave"), m("bob"), m("charlie"), m("alice")];
        let edges = graph.edges_in_order(&order);
        assert_eq!(edges[0], DebtEdge::new(m("dave"), m("charlie"), 1));
        assert_eq!(edges[1], DebtEdge::new(m("dave"), m("alice"), 7));
        assert_eq!(edges[2], DebtEdge::new(m("bob"), m("charlie"), 1));
    }

    #[test]
    fn test_pairwise_netted_detection() {
        let netted = DebtGraph::from_edges(vec![DebtEdge::new(m("a"), m("b"), 1)]);
        assert!(netted.is_pairwise_netted());
        let both = DebtGraph::from_edges(vec![
            DebtEdge::new(m("a"), m("b"), 1),
            DebtEdge::new(m("b"), m("a"), 1),
        ]);
        assert!(!both.is_pairwise_netted());
    }
}
