use crate::core::amount::Amount;
use crate::core::member::MemberId;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a value-transfer service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("{owner} holds {available}, transfer needs {requested}")]
    InsufficientBalance {
        owner: MemberId,
        available: Amount,
        requested: Amount,
    },
    #[error("{owner} allows {spender} to spend {allowance}, transfer needs {requested}")]
    InsufficientAllowance {
        owner: MemberId,
        spender: MemberId,
        allowance: Amount,
        requested: Amount,
    },
    #[error("transfer not confirmed within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// The fungible-token service settlements move value through.
///
/// The ledger never holds value itself. It checks that the payer can pay,
/// asks the service to move the funds, and only reduces the recorded debt
/// once the service confirms.
pub trait ValueTransfer: Send + Sync {
    /// Spendable value held by `owner`.
    fn balance_of(&self, owner: &MemberId) -> Amount;

    /// How much `spender` may move out of `owner`'s holdings.
    fn allowance(&self, owner: &MemberId, spender: &MemberId) -> Amount;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    ///
    /// Must return `Ok` only once the transfer is final. An implementation
    /// that cannot confirm within `timeout` must return
    /// [`TransferError::Timeout`] and leave balances unchanged.
    fn transfer_from(
        &self,
        spender: &MemberId,
        from: &MemberId,
        to: &MemberId,
        amount: Amount,
        timeout: Duration,
    ) -> Result<(), TransferError>;
}
