use crate::core::amount::{Amount, Balance};
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::member::MemberId;
use crate::ledger::debt_graph::DebtEdge;
use crate::ledger::debt_ledger::DebtLedger;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

/// Outcome of simplifying a group's debt table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplificationReport {
    /// Number of debts before simplification.
    pub edges_before: usize,
    /// Number of debts after simplification.
    pub edges_after: usize,
    /// Sum of all debts before simplification.
    pub gross_before: Amount,
    /// Sum of all debts after simplification.
    pub gross_after: Amount,
    /// The new debt table, in the order it was produced.
    pub edges: Vec<DebtEdge>,
}

impl SimplificationReport {
    /// Total debt no longer needing a transfer.
    pub fn savings(&self) -> Amount {
        self.gross_before.saturating_sub(self.gross_after)
    }

    /// Whether the simplification changed the number of debts.
    pub fn changed(&self) -> bool {
        self.edges_before != self.edges_after || self.gross_before != self.gross_after
    }
}

impl std::fmt::Display for SimplificationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Simplification ===")?;
        writeln!(f, "Debts:       {} → {}", self.edges_before, self.edges_after)?;
        writeln!(f, "Gross:       {} → {}", self.gross_before, self.gross_after)?;
        writeln!(f, "Savings:     {}", self.savings())?;
        for edge in &self.edges {
            writeln!(f, "  {}", edge)?;
        }
        Ok(())
    }
}

/// A party still waiting to be matched, ordered by remaining magnitude and
/// then by admission order (earlier member first).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Open {
    remaining: Amount,
    rank: Reverse<usize>,
}

/// Greedy debt simplification.
///
/// Replaces a debt table with an equivalent one derived from balances alone:
/// the largest creditor is repeatedly paid by the largest debtor until every
/// balance is matched. Not a minimum-transaction solver, but deterministic,
/// and never produces more than `n - 1` debts for `n` non-zero balances.
pub struct DebtSimplifier;

impl DebtSimplifier {
    /// Compute a debt table reproducing `balances`.
    ///
    /// `balances` must sum to zero. Their order is the tie-break: among
    /// equal remaining amounts, the member listed first is matched first.
    ///
    /// # Algorithm
    ///
    /// 1. Split members into creditors (> 0) and debtors (< 0); zeros drop out.
    /// 2. Take the largest creditor and the largest debtor.
    /// 3. The debtor owes the creditor the smaller of the two magnitudes.
    /// 4. Whoever still has a remainder goes back in the queue.
    /// 5. Stop when either side runs out.
    ///
    /// # Examples
    ///
    /// ```
    /// use group_ledger::core::member::MemberId;
    /// use group_ledger::optimization::simplifier::DebtSimplifier;
    ///
    /// let balances = vec![
    ///     (MemberId::new("dave"), -8),
    ///     (MemberId::new("bob"), -1),
    ///     (MemberId::new("charlie"), 2),
    ///     (MemberId::new("alice"), 7),
    /// ];
    /// let edges = DebtSimplifier::simplify(&balances);
    /// assert_eq!(edges.len(), 3);
    /// assert_eq!(edges[0].amount, 7);
    /// ```
    pub fn simplify(balances: &[(MemberId, Balance)]) -> Vec<DebtEdge> {
        debug_assert_eq!(balances.iter().map(|(_, b)| *b).sum::<Balance>(), 0);

        let mut creditors = BinaryHeap::new();
        let mut debtors = BinaryHeap::new();
        for (rank, (_, balance)) in balances.iter().enumerate() {
            let open = Open {
                remaining: balance.unsigned_abs(),
                rank: Reverse(rank),
            };
            if *balance > 0 {
                creditors.push(open);
            } else if *balance < 0 {
                debtors.push(open);
            }
        }

        let mut edges: Vec<DebtEdge> = Vec::new();
        while let (Some(creditor), Some(debtor)) = (creditors.pop(), debtors.pop()) {
            let amount = creditor.remaining.min(debtor.remaining);
            let from = &balances[debtor.rank.0].0;
            let to = &balances[creditor.rank.0].0;
            debug!("simplify: {} → {}: {}", from, to, amount);

            match edges
                .iter_mut()
                .find(|e| &e.debtor == from && &e.creditor == to)
            {
                Some(edge) => edge.amount += amount,
                None => edges.push(DebtEdge::new(from.clone(), to.clone(), amount)),
            }

            if creditor.remaining > amount {
                creditors.push(Open {
                    remaining: creditor.remaining - amount,
                    rank: creditor.rank,
                });
            }
            if debtor.remaining > amount {
                debtors.push(Open {
                    remaining: debtor.remaining - amount,
                    rank: debtor.rank,
                });
            }
        }

        debug_assert!(creditors.is_empty() && debtors.is_empty());
        edges
    }

    /// [`simplify`](Self::simplify) for balances from outside the engine.
    ///
    /// Fails with `DuplicateMember` if a member is listed twice and with
    /// `UnbalancedBalances` if the balances do not sum to zero.
    pub fn simplify_checked(balances: &[(MemberId, Balance)]) -> LedgerResult<Vec<DebtEdge>> {
        let mut seen = HashSet::with_capacity(balances.len());
        for (member, _) in balances {
            if !seen.insert(member) {
                return Err(LedgerError::DuplicateMember(member.clone()));
            }
        }
        let total = balances
            .iter()
            .try_fold(0 as Balance, |acc, (_, b)| acc.checked_add(*b));
        if total != Some(0) {
            return Err(LedgerError::UnbalancedBalances);
        }
        Ok(Self::simplify(balances))
    }

    /// Simplify `ledger` in place. `members` gives the tie-break order.
    ///
    /// Balances are left exactly as they were; only the debt table changes.
    pub fn simplify_ledger(
        ledger: &mut DebtLedger,
        members: &[MemberId],
    ) -> SimplificationReport {
        let edges_before = ledger.edge_count();
        let gross_before = ledger.gross_debt();

        let edges = Self::simplify(&ledger.balances_in_order(members));
        ledger.replace_debt_graph(edges.clone());

        SimplificationReport {
            edges_before,
            edges_after: ledger.edge_count(),
            gross_before,
            gross_after: ledger.gross_debt(),
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> MemberId {
        MemberId::new(s)
    }

    fn edge(d: &str, c: &str, amount: Amount) -> DebtEdge {
        DebtEdge::new(m(d), m(c), amount)
    }

    #[test]
    fn test_worked_example() {
        // Admission order: Dave, Bob, Charlie, Alice
        let balances = vec![(m("dave"), -8), (m("bob"), -1), (m("charlie"), 2), (m("alice"), 7)];
        let edges = DebtSimplifier::simplify(&balances);
        assert_eq!(
            edges,
            vec![
                edge("dave", "alice", 7),
                edge("dave", "charlie", 1),
                edge("bob", "charlie", 1),
            ]
        );
    }

    #[test]
    fn test_balanced_cycle_yields_no_edges() {
        let balances = vec![(m("a"), 0), (m("b"), 0), (m("c"), 0), (m("d"), 0)];
        assert!(DebtSimplifier::simplify(&balances).is_empty());
    }

    #[test]
    fn test_single_debtor_many_creditors() {
        let balances = vec![(m("dave"), 4), (m("bob"), -11), (m("charlie"), 2), (m("alice"), 5)];
        let edges = DebtSimplifier::simplify(&balances);
        assert_eq!(
            edges,
            vec![
                edge("bob", "alice", 5),
                edge("bob", "dave", 4),
                edge("bob", "charlie", 2),
            ]
        );
    }

    #[test]
    fn test_tie_break_follows_order() {
        let balances = vec![(m("x"), 3), (m("y"), 3), (m("p"), -3), (m("q"), -3)];
        let edges = DebtSimplifier::simplify(&balances);
        assert_eq!(edges, vec![edge("p", "x", 3), edge("q", "y", 3)]);
    }

    #[test]
    fn test_edge_count_bound() {
        let balances = vec![(m("a"), 10), (m("b"), -3), (m("c"), -3), (m("d"), -4)];
        let edges = DebtSimplifier::simplify(&balances);
        assert!(edges.len() <= 3);
        assert!(edges.iter().all(|e| e.amount > 0));
    }

    #[test]
    fn test_checked_rejects_duplicate_members() {
        let balances = vec![(m("alice"), 5), (m("bob"), 0), (m("alice"), -5)];
        let err = DebtSimplifier::simplify_checked(&balances).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateMember(ref member) if member == &m("alice")));
    }

    #[test]
    fn test_checked_rejects_unbalanced_input() {
        let balances = vec![(m("alice"), 5), (m("bob"), -4)];
        let err = DebtSimplifier::simplify_checked(&balances).unwrap_err();
        assert!(matches!(err, LedgerError::UnbalancedBalances));

        let overflow = vec![(m("a"), Balance::MAX), (m("b"), 1), (m("c"), Balance::MIN)];
        assert!(DebtSimplifier::simplify_checked(&overflow).is_err());
    }

    #[test]
    fn test_checked_matches_simplify() {
        let balances = vec![(m("dave"), -8), (m("bob"), -1), (m("charlie"), 2), (m("alice"), 7)];
        let edges = DebtSimplifier::simplify_checked(&balances).unwrap();
        assert_eq!(edges, DebtSimplifier::simplify(&balances));
        assert!(edges.iter().all(|e| e.debtor != e.creditor));
    }

    #[test]
    fn test_simplify_ledger_collapses_chain() {
        // alice owes bob 10, alice owes charlie 10, bob owes charlie 10
        let mut ledger = DebtLedger::new();
        let members = vec![m("dave"), m("bob"), m("charlie"), m("alice")];
        for member in &members {
            ledger.open_account(member);
        }
        ledger.apply_expense(&m("bob"), &[m("alice")], &[10]);
        ledger.apply_expense(&m("charlie"), &[m("alice")], &[10]);
        ledger.apply_expense(&m("charlie"), &[m("bob")], &[10]);

        let report = DebtSimplifier::simplify_ledger(&mut ledger, &members);
        assert_eq!(report.edges_before, 3);
        assert_eq!(report.edges_after, 1);
        assert_eq!(report.gross_before, 30);
        assert_eq!(report.gross_after, 20);
        assert_eq!(report.savings(), 10);
        assert_eq!(ledger.debt_between(&m("alice"), &m("charlie")), 20);
        assert_eq!(ledger.balance_of(&m("bob")), 0);
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let mut ledger = DebtLedger::new();
        let members = vec![m("a"), m("b"), m("c")];
        for member in &members {
            ledger.open_account(member);
        }
        ledger.apply_expense(&m("a"), &[m("b"), m("c")], &[5, 7]);
        ledger.apply_expense(&m("b"), &[m("c")], &[4]);

        let first = DebtSimplifier::simplify_ledger(&mut ledger, &members);
        let second = DebtSimplifier::simplify_ledger(&mut ledger, &members);
        assert_eq!(first.edges, second.edges);
        assert!(!second.changed());
    }
}
