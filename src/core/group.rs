use crate::core::amount::Balance;
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::event::{GroupEvent, RecordedEvent};
use crate::core::expense::{Expense, ExpenseId};
use crate::core::member::MemberId;
use crate::core::settlement::SettlementRecord;
use crate::ledger::debt_ledger::DebtLedger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a group. Assigned sequentially by the registry, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(u64);

impl GroupId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The group aggregate.
///
/// Owns everything that belongs to one group: membership, the debt ledger,
/// the expense and settlement history and the event log. Nothing in here is
/// shared with another group, so one lock per `Group` is enough to serialise
/// every operation on it.
#[derive(Debug, Clone)]
pub struct Group {
    id: GroupId,
    name: String,
    creator: MemberId,
    /// Members in admission order. The order is the simplifier's tie-break.
    members: Vec<MemberId>,
    /// Identities waiting for approval. Never overlaps `members`.
    pending: Vec<MemberId>,
    ledger: DebtLedger,
    expenses: Vec<Expense>,
    settlements: Vec<SettlementRecord>,
    events: Vec<RecordedEvent>,
    next_expense_id: u64,
    created_at: DateTime<Utc>,
}

impl Group {
    /// Build a group whose members are `members`, already deduplicated and
    /// starting with the creator.
    pub(crate) fn new(id: GroupId, name: String, members: Vec<MemberId>) -> Self {
        debug_assert!(!members.is_empty());
        let creator = members[0].clone();
        let mut ledger = DebtLedger::new();
        for member in &members {
            ledger.open_account(member);
        }
        Self {
            id,
            name,
            creator,
            members,
            pending: Vec::new(),
            ledger,
            expenses: Vec::new(),
            settlements: Vec::new(),
            events: Vec::new(),
            next_expense_id: 1,
            created_at: Utc::now(),
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn creator(&self) -> &MemberId {
        &self.creator
    }

    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn pending_requests(&self) -> &[MemberId] {
        &self.pending
    }

    pub fn ledger(&self) -> &DebtLedger {
        &self.ledger
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn settlements(&self) -> &[SettlementRecord] {
        &self.settlements
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_member(&self, member: &MemberId) -> bool {
        self.members.contains(member)
    }

    pub fn has_pending_request(&self, member: &MemberId) -> bool {
        self.pending.contains(member)
    }

    /// Fail with `NotAMember` unless `member` belongs to the group.
    pub fn ensure_member(&self, member: &MemberId) -> LedgerResult<()> {
        if self.is_member(member) {
            Ok(())
        } else {
            Err(LedgerError::NotAMember {
                group: self.id,
                member: member.clone(),
            })
        }
    }

    /// Balances of every member in admission order.
    pub fn balances(&self) -> Vec<(MemberId, Balance)> {
        self.ledger.balances_in_order(&self.members)
    }

    // --- Mutators used by the managers ---

    pub(crate) fn ledger_mut(&mut self) -> &mut DebtLedger {
        &mut self.ledger
    }

    pub(crate) fn add_pending(&mut self, member: MemberId) {
        self.pending.push(member);
    }

    /// Remove `member` from the pending list. Returns whether it was there.
    pub(crate) fn take_pending(&mut self, member: &MemberId) -> bool {
        match self.pending.iter().position(|m| m == member) {
            Some(idx) => {
                self.pending.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn admit(&mut self, member: MemberId) {
        debug_assert!(!self.is_member(&member));
        self.ledger.open_account(&member);
        self.members.push(member);
    }

    pub(crate) fn next_expense_id(&mut self) -> ExpenseId {
        let id = ExpenseId::new(self.next_expense_id);
        self.next_expense_id += 1;
        id
    }

    pub(crate) fn push_expense(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    pub(crate) fn push_settlement(&mut self, record: SettlementRecord) {
        self.settlements.push(record);
    }

    pub(crate) fn record(&mut self, event: GroupEvent) {
        debug_assert_eq!(event.group(), self.id);
        self.events.push(RecordedEvent::now(event));
    }

    /// Read-only snapshot handed out to clients.
    pub fn view(&self) -> GroupView {
        GroupView {
            id: self.id,
            name: self.name.clone(),
            creator: self.creator.clone(),
            members: self.members.clone(),
            pending_requests: self.pending.clone(),
            balances: self
                .balances()
                .into_iter()
                .map(|(member, balance)| MemberBalance { member, balance })
                .collect(),
            created_at: self.created_at,
        }
    }
}

/// A member's position in a [`GroupView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member: MemberId,
    pub balance: Balance,
}

/// What `retrieve_group` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupView {
    pub id: GroupId,
    pub name: String,
    pub creator: MemberId,
    pub members: Vec<MemberId>,
    pub pending_requests: Vec<MemberId>,
    pub balances: Vec<MemberBalance>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_group() -> Group {
        Group::new(
            GroupId::new(1),
            "Spesa casa pisa".to_string(),
            vec![MemberId::new("dave"), MemberId::new("bob")],
        )
    }

    #[test]
    fn test_creator_is_first_member() {
        let g = sample_group();
        assert_eq!(g.creator().as_str(), "dave");
        assert!(g.is_member(&MemberId::new("bob")));
        assert!(!g.is_member(&MemberId::new("eve")));
    }

    #[test]
    fn test_ensure_member_reports_group() {
        let g = sample_group();
        let err = g.ensure_member(&MemberId::new("eve")).unwrap_err();
        match err {
            LedgerError::NotAMember { group, member } => {
                assert_eq!(group, GroupId::new(1));
                assert_eq!(member.as_str(), "eve");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_expense_ids_are_sequential() {
        let mut g = sample_group();
        assert_eq!(g.next_expense_id(), ExpenseId::new(1));
        assert_eq!(g.next_expense_id(), ExpenseId::new(2));
    }

    #[test]
    fn test_view_lists_zero_balances() {
        let g = sample_group();
        let view = g.view();
        assert_eq!(view.members.len(), 2);
        assert!(view.balances.iter().all(|b| b.balance == 0));
        assert!(view.pending_requests.is_empty());
    }
}
