use crate::core::amount::Amount;
use crate::core::member::MemberId;
use crate::settlement::transfer::{TransferError, ValueTransfer};
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default)]
struct TokenState {
    balances: HashMap<MemberId, Amount>,
    /// (owner, spender) -> remaining allowance
    allowances: HashMap<(MemberId, MemberId), Amount>,
    halted: bool,
}

/// In-process token implementing [`ValueTransfer`].
///
/// Holds balances and allowances in memory. Used by the CLI replay, the
/// benchmarks and the tests; a deployment plugs in its own service.
///
/// # Examples
///
/// ```
/// use group_ledger::core::member::MemberId;
/// use group_ledger::settlement::token::InMemoryToken;
/// use group_ledger::settlement::transfer::ValueTransfer;
///
/// let token = InMemoryToken::new();
/// let alice = MemberId::new("alice");
/// let ledger = MemberId::new("group-ledger");
///
/// token.deposit(&alice, 10);
/// token.approve(&alice, &ledger, 4);
/// assert_eq!(token.balance_of(&alice), 10);
/// assert_eq!(token.allowance(&alice, &ledger), 4);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryToken {
    state: Mutex<TokenState>,
}

impl InMemoryToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `owner` with newly issued value.
    pub fn deposit(&self, owner: &MemberId, amount: Amount) {
        let mut state = self.state.lock();
        let balance = state.balances.entry(owner.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Set how much `spender` may move out of `owner`'s holdings.
    pub fn approve(&self, owner: &MemberId, spender: &MemberId, amount: Amount) {
        let mut state = self.state.lock();
        state
            .allowances
            .insert((owner.clone(), spender.clone()), amount);
    }

    /// Reject every transfer until [`resume`](Self::resume) is called.
    pub fn halt(&self) {
        self.state.lock().halted = true;
    }

    pub fn resume(&self) {
        self.state.lock().halted = false;
    }
}

impl ValueTransfer for InMemoryToken {
    fn balance_of(&self, owner: &MemberId) -> Amount {
        self.state.lock().balances.get(owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &MemberId, spender: &MemberId) -> Amount {
        self.state
            .lock()
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    // In-memory transfers complete immediately, so the timeout never fires.
    fn transfer_from(
        &self,
        spender: &MemberId,
        from: &MemberId,
        to: &MemberId,
        amount: Amount,
        _timeout: Duration,
    ) -> Result<(), TransferError> {
        let mut state = self.state.lock();
        if state.halted {
            return Err(TransferError::Rejected("token is halted".to_string()));
        }

        let available = state.balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                owner: from.clone(),
                available,
                requested: amount,
            });
        }
        let allowance_key = (from.clone(), spender.clone());
        let allowance = state.allowances.get(&allowance_key).copied().unwrap_or(0);
        if allowance < amount {
            return Err(TransferError::InsufficientAllowance {
                owner: from.clone(),
                spender: spender.clone(),
                allowance,
                requested: amount,
            });
        }

        state.allowances.insert(allowance_key, allowance - amount);
        state.balances.insert(from.clone(), available - amount);
        let credited = state.balances.entry(to.clone()).or_insert(0);
        *credited = credited.saturating_add(amount);
        debug!("token: {} moved {} from {} to {}", spender, amount, from, to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> MemberId {
        MemberId::new(s)
    }

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn test_transfer_moves_value_and_spends_allowance() {
        let token = InMemoryToken::new();
        token.deposit(&m("alice"), 10);
        token.approve(&m("alice"), &m("op"), 6);

        token
            .transfer_from(&m("op"), &m("alice"), &m("bob"), 4, TIMEOUT)
            .unwrap();
        assert_eq!(token.balance_of(&m("alice")), 6);
        assert_eq!(token.balance_of(&m("bob")), 4);
        assert_eq!(token.allowance(&m("alice"), &m("op")), 2);
    }

    #[test]
    fn test_transfer_checks_balance_then_allowance() {
        let token = InMemoryToken::new();
        token.deposit(&m("alice"), 3);
        token.approve(&m("alice"), &m("op"), 1);

        let err = token
            .transfer_from(&m("op"), &m("alice"), &m("bob"), 4, TIMEOUT)
            .unwrap_err();
        assert!(matches!(err, TransferError::InsufficientBalance { available: 3, .. }));

        let err = token
            .transfer_from(&m("op"), &m("alice"), &m("bob"), 2, TIMEOUT)
            .unwrap_err();
        assert!(matches!(err, TransferError::InsufficientAllowance { allowance: 1, .. }));
        assert_eq!(token.balance_of(&m("alice")), 3);
    }

    #[test]
    fn test_halted_token_rejects() {
        let token = InMemoryToken::new();
        token.deposit(&m("alice"), 10);
        token.approve(&m("alice"), &m("op"), 10);
        token.halt();
        assert!(token
            .transfer_from(&m("op"), &m("alice"), &m("bob"), 1, TIMEOUT)
            .is_err());
        token.resume();
        assert!(token
            .transfer_from(&m("op"), &m("alice"), &m("bob"), 1, TIMEOUT)
            .is_ok());
    }
}
