use crate::config::EngineConfig;
use crate::core::amount::{Amount, Balance};
use crate::core::error::LedgerResult;
use crate::core::event::{GroupEvent, RecordedEvent};
use crate::core::expense::{Expense, ExpenseId, Share};
use crate::core::group::{Group, GroupId, GroupView};
use crate::core::member::MemberId;
use crate::core::settlement::SettlementRecord;
use crate::ledger::debt_graph::DebtEdge;
use crate::membership::manager::MembershipManager;
use crate::optimization::simplifier::{DebtSimplifier, SimplificationReport};
use crate::service::registry::GroupRegistry;
use crate::settlement::processor::SettlementProcessor;
use crate::settlement::token::InMemoryToken;
use crate::settlement::transfer::ValueTransfer;
use crate::split::method::SplitMethod;
use crate::split::splitter::ExpenseSplitter;
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;

/// The group accounting engine.
///
/// Every operation locks exactly one group for its whole duration, so each
/// one applies atomically with respect to other operations on that group.
/// Validation runs before any mutation: an `Err` leaves the group untouched.
///
/// # Examples
///
/// ```
/// use group_ledger::prelude::*;
///
/// let (ledger, _token) = LedgerService::in_memory(EngineConfig::default());
/// let alice = MemberId::new("alice");
/// let bob = MemberId::new("bob");
///
/// let group = ledger.create_group(&alice, "Trip", &[bob.clone()]);
/// let everyone = [alice.clone(), bob.clone()];
/// ledger
///     .register_expense(group, &alice, "Dinner", 8, &everyone, SplitMethod::Equal)
///     .unwrap();
///
/// assert_eq!(ledger.debt_between(group, &bob, &alice).unwrap(), 4);
/// assert_eq!(ledger.balance_of(group, &alice).unwrap(), 4);
/// ```
pub struct LedgerService {
    config: EngineConfig,
    registry: GroupRegistry,
    settlement: SettlementProcessor,
}

impl LedgerService {
    pub fn new(config: EngineConfig, transfer: Arc<dyn ValueTransfer>) -> Self {
        let settlement =
            SettlementProcessor::new(transfer, config.operator.clone(), config.transfer_timeout());
        Self {
            config,
            registry: GroupRegistry::new(),
            settlement,
        }
    }

    /// An engine backed by a fresh [`InMemoryToken`], returned alongside it
    /// so the caller can fund wallets and grant allowances.
    pub fn in_memory(config: EngineConfig) -> (Self, Arc<InMemoryToken>) {
        let token = Arc::new(InMemoryToken::new());
        let service = Self::new(config, token.clone());
        (service, token)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Identity members must authorise before settling.
    pub fn operator(&self) -> &MemberId {
        self.settlement.operator()
    }

    fn group(&self, id: GroupId) -> LedgerResult<Arc<Mutex<Group>>> {
        self.registry.get(id)
    }

    // --- Membership ---

    pub fn create_group(&self, creator: &MemberId, name: &str, invitees: &[MemberId]) -> GroupId {
        self.registry.create(creator, name, invitees)
    }

    pub fn request_to_join(&self, group: GroupId, identity: &MemberId) -> LedgerResult<()> {
        let handle = self.group(group)?;
        let mut group = handle.lock();
        MembershipManager::request_to_join(&mut group, identity)
    }

    pub fn approve(
        &self,
        group: GroupId,
        approver: &MemberId,
        identity: &MemberId,
    ) -> LedgerResult<()> {
        let handle = self.group(group)?;
        let mut group = handle.lock();
        MembershipManager::approve(&mut group, approver, identity)
    }

    pub fn reject(
        &self,
        group: GroupId,
        approver: &MemberId,
        identity: &MemberId,
    ) -> LedgerResult<()> {
        let handle = self.group(group)?;
        let mut group = handle.lock();
        MembershipManager::reject(&mut group, approver, identity)
    }

    // --- Accounting ---

    /// `payer` records paying `amount` on behalf of `participants`, split by
    /// `method`. The payer may or may not be among the participants.
    pub fn register_expense(
        &self,
        group: GroupId,
        payer: &MemberId,
        description: &str,
        amount: Amount,
        participants: &[MemberId],
        method: SplitMethod,
    ) -> LedgerResult<ExpenseId> {
        let handle = self.group(group)?;
        let mut group = handle.lock();

        group.ensure_member(payer)?;
        let shares = ExpenseSplitter::split(amount, participants.len(), &method)?;
        for participant in participants {
            group.ensure_member(participant)?;
        }

        group.ledger_mut().apply_expense(payer, participants, &shares);

        let id = group.next_expense_id();
        let expense = Expense::new(
            id,
            group.id(),
            description,
            payer.clone(),
            amount,
            method.kind(),
            participants
                .iter()
                .zip(&shares)
                .map(|(member, &amount)| Share {
                    member: member.clone(),
                    amount,
                })
                .collect(),
        );
        group.push_expense(expense);

        let group_id = group.id();
        group.record(GroupEvent::ExpenseRegistered {
            group: group_id,
            expense: id,
            payer: payer.clone(),
            amount,
            description: description.to_string(),
            participants: participants.to_vec(),
            shares,
        });
        info!(
            "expense {} in group {}: {} paid {} ({}) for {} participants",
            id,
            group_id,
            payer,
            amount,
            method.kind(),
            participants.len()
        );
        Ok(id)
    }

    /// Collapse the group's debt table. Balances do not change.
    pub fn simplify(
        &self,
        group: GroupId,
        caller: &MemberId,
    ) -> LedgerResult<SimplificationReport> {
        let handle = self.group(group)?;
        let mut group = handle.lock();
        group.ensure_member(caller)?;

        let members = group.members().to_vec();
        let report = DebtSimplifier::simplify_ledger(group.ledger_mut(), &members);
        let group_id = group.id();
        group.record(GroupEvent::DebtSimplified {
            group: group_id,
            edges_before: report.edges_before,
            edges_after: report.edges_after,
        });
        info!(
            "group {} simplified by {}: {} debts -> {}, gross {} -> {}",
            group_id,
            caller,
            report.edges_before,
            report.edges_after,
            report.gross_before,
            report.gross_after
        );
        Ok(report)
    }

    /// `payer` repays `amount` of their debt to `payee`.
    pub fn settle(
        &self,
        group: GroupId,
        payer: &MemberId,
        payee: &MemberId,
        amount: Amount,
    ) -> LedgerResult<SettlementRecord> {
        let handle = self.group(group)?;
        let mut group = handle.lock();
        self.settlement.settle(&mut group, payer, payee, amount)
    }

    // --- Views ---

    pub fn retrieve_group(&self, group: GroupId, caller: &MemberId) -> LedgerResult<GroupView> {
        let handle = self.group(group)?;
        let group = handle.lock();
        group.ensure_member(caller)?;
        Ok(group.view())
    }

    pub fn balance_of(&self, group: GroupId, identity: &MemberId) -> LedgerResult<Balance> {
        let handle = self.group(group)?;
        let balance = handle.lock().ledger().balance_of(identity);
        Ok(balance)
    }

    pub fn debt_between(
        &self,
        group: GroupId,
        debtor: &MemberId,
        creditor: &MemberId,
    ) -> LedgerResult<Amount> {
        let handle = self.group(group)?;
        let debt = handle.lock().ledger().debt_between(debtor, creditor);
        Ok(debt)
    }

    /// Every outstanding debt, ordered by debtor then creditor admission order.
    pub fn debts(&self, group: GroupId, caller: &MemberId) -> LedgerResult<Vec<DebtEdge>> {
        let handle = self.group(group)?;
        let group = handle.lock();
        group.ensure_member(caller)?;
        Ok(group.ledger().debt_graph().edges_in_order(group.members()))
    }

    pub fn expense_history(&self, group: GroupId, caller: &MemberId) -> LedgerResult<Vec<Expense>> {
        let handle = self.group(group)?;
        let group = handle.lock();
        group.ensure_member(caller)?;
        Ok(group.expenses().to_vec())
    }

    pub fn settlement_history(
        &self,
        group: GroupId,
        caller: &MemberId,
    ) -> LedgerResult<Vec<SettlementRecord>> {
        let handle = self.group(group)?;
        let group = handle.lock();
        group.ensure_member(caller)?;
        Ok(group.settlements().to_vec())
    }

    pub fn events(&self, group: GroupId, caller: &MemberId) -> LedgerResult<Vec<RecordedEvent>> {
        let handle = self.group(group)?;
        let group = handle.lock();
        group.ensure_member(caller)?;
        Ok(group.events().to_vec())
    }

    pub fn groups_of(&self, identity: &MemberId) -> Vec<GroupId> {
        self.registry.groups_of(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::amount::MAX_AMOUNT;
    use crate::core::error::LedgerError;
    use std::thread;

    fn m(s: &str) -> MemberId {
        MemberId::new(s)
    }

    fn service() -> (LedgerService, Arc<InMemoryToken>) {
        LedgerService::in_memory(EngineConfig::default())
    }

    #[test]
    fn test_register_expense_records_shares() {
        let (ledger, _) = service();
        let g = ledger.create_group(&m("payer"), "Trip", &[m("p1"), m("p2")]);
        let everyone = [m("payer"), m("p1"), m("p2")];
        let id = ledger
            .register_expense(g, &m("payer"), "Taxi", 8, &everyone, SplitMethod::Equal)
            .unwrap();
        assert_eq!(id, ExpenseId::new(1));

        assert_eq!(ledger.debt_between(g, &m("p1"), &m("payer")).unwrap(), 3);
        assert_eq!(ledger.debt_between(g, &m("p2"), &m("payer")).unwrap(), 2);
        assert_eq!(ledger.balance_of(g, &m("payer")).unwrap(), 5);

        let history = ledger.expense_history(g, &m("p1")).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].owed_to_payer(), 5);
    }

    #[test]
    fn test_outsiders_are_rejected() {
        let (ledger, _) = service();
        let g = ledger.create_group(&m("alice"), "Trip", &[m("bob")]);

        let err = ledger
            .register_expense(g, &m("eve"), "x", 5, &[m("alice")], SplitMethod::Equal)
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotAMember { .. }));

        let err = ledger
            .register_expense(g, &m("alice"), "x", 5, &[m("alice"), m("eve")], SplitMethod::Equal)
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotAMember { .. }));
        assert_eq!(ledger.balance_of(g, &m("alice")).unwrap(), 0);

        assert!(matches!(
            ledger.retrieve_group(g, &m("eve")).unwrap_err(),
            LedgerError::NotAMember { .. }
        ));
        assert!(matches!(
            ledger.simplify(g, &m("eve")).unwrap_err(),
            LedgerError::NotAMember { .. }
        ));
    }

    #[test]
    fn test_split_error_leaves_group_untouched() {
        let (ledger, _) = service();
        let g = ledger.create_group(&m("alice"), "Trip", &[m("bob")]);
        let exact = SplitMethod::Exact(vec![3, 3]);
        let err = ledger
            .register_expense(g, &m("alice"), "x", 10, &[m("alice"), m("bob")], exact)
            .unwrap_err();
        assert!(matches!(err, LedgerError::SplitSumMismatch { expected: 10, actual: 6 }));
        assert!(ledger.expense_history(g, &m("alice")).unwrap().is_empty());
        assert_eq!(ledger.events(g, &m("alice")).unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_group() {
        let (ledger, _) = service();
        let err = ledger.balance_of(GroupId::new(42), &m("alice")).unwrap_err();
        assert!(matches!(err, LedgerError::GroupNotFound(_)));
    }

    #[test]
    fn test_simplify_records_event() {
        let (ledger, _) = service();
        let g = ledger.create_group(&m("a"), "g", &[m("b"), m("c")]);
        ledger.register_expense(g, &m("b"), "x", 10, &[m("a")], SplitMethod::Equal).unwrap();
        ledger.register_expense(g, &m("c"), "y", 10, &[m("b")], SplitMethod::Equal).unwrap();

        let report = ledger.simplify(g, &m("a")).unwrap();
        assert_eq!(report.edges_before, 2);
        assert_eq!(report.edges_after, 1);
        assert_eq!(ledger.debts(g, &m("a")).unwrap(), vec![DebtEdge::new(m("a"), m("c"), 10)]);

        let events = ledger.events(g, &m("a")).unwrap();
        assert!(matches!(
            events.last().map(|e| &e.event),
            Some(GroupEvent::DebtSimplified { edges_before: 2, edges_after: 1, .. })
        ));
    }

    #[test]
    fn test_simplify_debts_past_single_expense_limit() {
        let (ledger, _) = service();
        let g = ledger.create_group(&m("alice"), "g", &[m("bob")]);
        for _ in 0..2 {
            ledger
                .register_expense(g, &m("alice"), "x", MAX_AMOUNT, &[m("bob")], SplitMethod::Equal)
                .unwrap();
        }

        let report = ledger.simplify(g, &m("alice")).unwrap();
        assert_eq!(report.edges_after, 1);
        assert_eq!(report.gross_after, 2 * MAX_AMOUNT);
        assert_eq!(ledger.debt_between(g, &m("bob"), &m("alice")).unwrap(), 2 * MAX_AMOUNT);
        assert_eq!(ledger.balance_of(g, &m("alice")).unwrap(), (2 * MAX_AMOUNT) as Balance);
        assert_eq!(ledger.balance_of(g, &m("bob")).unwrap(), -((2 * MAX_AMOUNT) as Balance));
    }

    #[test]
    fn test_settle_through_service() {
        let (ledger, token) = service();
        let g = ledger.create_group(&m("alice"), "g", &[m("bob")]);
        ledger
            .register_expense(g, &m("alice"), "x", 10, &[m("alice"), m("bob")], SplitMethod::Equal)
            .unwrap();
        token.deposit(&m("bob"), 5);
        token.approve(&m("bob"), ledger.operator(), 5);

        let record = ledger.settle(g, &m("bob"), &m("alice"), 5).unwrap();
        assert_eq!(record.payee(), &m("alice"));
        assert_eq!(ledger.debt_between(g, &m("bob"), &m("alice")).unwrap(), 0);
        assert_eq!(ledger.settlement_history(g, &m("alice")).unwrap().len(), 1);
        assert!(ledger.debts(g, &m("alice")).unwrap().is_empty());
    }

    #[test]
    fn test_groups_in_parallel() {
        let (ledger, _) = service();
        let ledger = Arc::new(ledger);
        let groups: Vec<GroupId> = (0..4)
            .map(|i| ledger.create_group(&m("alice"), &format!("g{i}"), &[m("bob")]))
            .collect();

        let workers: Vec<_> = groups
            .iter()
            .map(|&g| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    let both = [m("alice"), m("bob")];
                    for _ in 0..50 {
                        ledger
                            .register_expense(g, &m("alice"), "x", 3, &both, SplitMethod::Equal)
                            .unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        for g in groups {
            // 3 split two ways: alice keeps 2, bob owes 1 each time
            assert_eq!(ledger.debt_between(g, &m("bob"), &m("alice")).unwrap(), 50);
            assert_eq!(ledger.expense_history(g, &m("bob")).unwrap().len(), 50);
        }
        assert_eq!(ledger.groups_of(&m("bob")).len(), 4);
    }
}
