use crate::core::amount::{as_balance, total_as_balance, Amount, Balance};
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::member::MemberId;
use crate::ledger::debt_graph::{DebtEdge, DebtGraph};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Balances and pairwise debts of one group.
///
/// A positive balance means the member is owed (net creditor).
/// A negative balance means the member owes (net debtor).
///
/// Balances are the authoritative economic position and are maintained
/// incrementally. The pairwise table records who owes whom; it is kept
/// netted (at most one direction per pair) and may be regenerated wholesale
/// by the simplifier without touching balances.
///
/// Invariants after every mutation:
/// - balances sum to zero
/// - every stored debt is positive
/// - no pair of members owes each other in both directions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtLedger {
    balances: HashMap<MemberId, Balance>,
    /// (debtor, creditor) -> amount, only while amount > 0
    #[serde(with = "debts_serde")]
    debts: HashMap<(MemberId, MemberId), Amount>,
}

/// The debt table travels as a list of [`DebtEdge`]s, sorted by debtor then
/// creditor. Member ids are free-form strings, so they never get packed into
/// a single map key.
mod debts_serde {
    use super::*;
    use serde::de;

    pub fn serialize<S: serde::Serializer>(
        debts: &HashMap<(MemberId, MemberId), Amount>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut edges: Vec<DebtEdge> = debts
            .iter()
            .map(|((d, c), &amt)| DebtEdge::new(d.clone(), c.clone(), amt))
            .collect();
        edges.sort_by(|a, b| (&a.debtor, &a.creditor).cmp(&(&b.debtor, &b.creditor)));
        serializer.collect_seq(edges)
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<(MemberId, MemberId), Amount>, D::Error> {
        let edges = Vec::<DebtEdge>::deserialize(deserializer)?;
        let mut debts = HashMap::with_capacity(edges.len());
        for edge in edges {
            if edge.amount == 0 || edge.debtor == edge.creditor {
                return Err(de::Error::custom(format!("invalid debt: {edge}")));
            }
            let key = (edge.debtor, edge.creditor);
            if debts.insert(key.clone(), edge.amount).is_some() {
                return Err(de::Error::custom(format!(
                    "duplicate debt: {} -> {}",
                    key.0, key.1
                )));
            }
        }
        Ok(debts)
    }
}

impl DebtLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `member` with a zero balance. No-op if already tracked.
    pub fn open_account(&mut self, member: &MemberId) {
        self.balances.entry(member.clone()).or_insert(0);
    }

    /// Apply an already-split expense: every participant other than the payer
    /// owes the payer their share.
    ///
    /// The new debt first drains any debt the payer already owes that
    /// participant, so the pair stays netted.
    pub fn apply_expense(
        &mut self,
        payer: &MemberId,
        participants: &[MemberId],
        shares: &[Amount],
    ) {
        debug_assert_eq!(participants.len(), shares.len());
        for (participant, &share) in participants.iter().zip(shares) {
            if participant == payer || share == 0 {
                continue;
            }
            *self.balances.entry(participant.clone()).or_insert(0) -= as_balance(share);
            *self.balances.entry(payer.clone()).or_insert(0) += as_balance(share);
            self.add_debt(participant, payer, share);
        }
        debug_assert!(self.is_balanced());
    }

    /// Record that `debtor` owes `creditor` `amount` more, netting against the
    /// opposite direction first.
    fn add_debt(&mut self, debtor: &MemberId, creditor: &MemberId, amount: Amount) {
        let reverse_key = (creditor.clone(), debtor.clone());
        let reverse = self.debts.get(&reverse_key).copied().unwrap_or(0);
        let netted = amount.min(reverse);

        if netted > 0 {
            if reverse == netted {
                self.debts.remove(&reverse_key);
            } else {
                self.debts.insert(reverse_key, reverse - netted);
            }
        }

        let rest = amount - netted;
        if rest > 0 {
            *self
                .debts
                .entry((debtor.clone(), creditor.clone()))
                .or_insert(0) += rest;
        }
        debug!(
            "debt {} -> {}: +{} (netted {} against reverse)",
            debtor, creditor, amount, netted
        );
    }

    /// Amount `debtor` currently owes `creditor`. Zero if nothing is recorded.
    pub fn debt_between(&self, debtor: &MemberId, creditor: &MemberId) -> Amount {
        self.debts
            .get(&(debtor.clone(), creditor.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Net balance of `member`. Zero for unknown members.
    pub fn balance_of(&self, member: &MemberId) -> Balance {
        self.balances.get(member).copied().unwrap_or(0)
    }

    /// Balances of `members`, in the given order.
    pub fn balances_in_order(&self, members: &[MemberId]) -> Vec<(MemberId, Balance)> {
        members
            .iter()
            .map(|m| (m.clone(), self.balance_of(m)))
            .collect()
    }

    /// Lower the debt `debtor` owes `creditor` by `amount` and move both
    /// balances toward zero by the same amount.
    ///
    /// Fails with `InsufficientDebt`, leaving the ledger untouched, if the
    /// recorded debt is smaller than `amount`.
    pub fn reduce_debt(
        &mut self,
        debtor: &MemberId,
        creditor: &MemberId,
        amount: Amount,
    ) -> LedgerResult<()> {
        let key = (debtor.clone(), creditor.clone());
        let debt = self.debts.get(&key).copied().unwrap_or(0);
        if amount > debt {
            return Err(LedgerError::InsufficientDebt {
                debtor: debtor.clone(),
                creditor: creditor.clone(),
                debt,
                requested: amount,
            });
        }
        if amount == 0 {
            return Ok(());
        }

        if debt == amount {
            self.debts.remove(&key);
        } else {
            self.debts.insert(key, debt - amount);
        }
        *self.balances.entry(debtor.clone()).or_insert(0) += total_as_balance(amount);
        *self.balances.entry(creditor.clone()).or_insert(0) -= total_as_balance(amount);
        debug_assert!(self.is_balanced());
        Ok(())
    }

    /// Throw away every pairwise debt and install `edges` instead. The edges
    /// must reproduce the current balances; the simplifier guarantees this.
    ///
    /// Balances are not touched: this changes how debts are represented, not
    /// who is owed what. Edges are merged and netted on the way in, so the
    /// table invariants hold whatever the input.
    pub(crate) fn replace_debt_graph(&mut self, edges: impl IntoIterator<Item = DebtEdge>) {
        self.debts.clear();
        for edge in edges {
            if edge.amount == 0 || edge.debtor == edge.creditor {
                continue;
            }
            self.add_debt(&edge.debtor, &edge.creditor, edge.amount);
        }
        debug_assert!(self.is_consistent());
    }

    /// Number of stored debts.
    pub fn edge_count(&self) -> usize {
        self.debts.len()
    }

    /// Sum of all stored debts.
    pub fn gross_debt(&self) -> Amount {
        self.debts.values().sum()
    }

    /// The debt table as a graph.
    pub fn debt_graph(&self) -> DebtGraph {
        DebtGraph::from_edges(
            self.debts
                .iter()
                .map(|((d, c), &amt)| DebtEdge::new(d.clone(), c.clone(), amt)),
        )
    }

    /// All tracked balances.
    pub fn all_balances(&self) -> &HashMap<MemberId, Balance> {
        &self.balances
    }

    /// Verify that balances sum to zero.
    pub fn is_balanced(&self) -> bool {
        self.balances.values().sum::<Balance>() == 0
    }

    /// Verify every invariant, including that the debt table reproduces the
    /// balances exactly.
    pub fn is_consistent(&self) -> bool {
        if !self.is_balanced() || self.debts.values().any(|&a| a == 0) {
            return false;
        }
        let graph = self.debt_graph();
        if !graph.is_pairwise_netted() {
            return false;
        }
        let implied = graph.implied_balances();
        self.balances
            .iter()
            .all(|(m, &b)| implied.get(m).copied().unwrap_or(0) == b)
            && implied.keys().all(|m| self.balances.contains_key(m))
    }
}
