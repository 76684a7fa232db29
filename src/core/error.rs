use crate::core::amount::Amount;
use crate::core::group::GroupId;
use crate::core::member::MemberId;
use crate::settlement::transfer::TransferError;
use thiserror::Error;

/// Every way a ledger operation can fail.
///
/// Validation always runs before any mutation, so an `Err` means the
/// group is exactly as it was before the call.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{member} is not a member of group {group}")]
    NotAMember { group: GroupId, member: MemberId },

    #[error("group {0} does not exist")]
    GroupNotFound(GroupId),

    #[error("amount must be greater than 0 and at most the supported maximum, got {0}")]
    InvalidAmount(Amount),

    #[error("an expense needs at least one participant")]
    NoParticipants,

    #[error("number of values ({values}) does not match number of participants ({participants})")]
    MismatchedSplitArity { participants: usize, values: usize },

    #[error("sum of exact values {actual} does not equal the expense amount {expected}")]
    SplitSumMismatch { expected: Amount, actual: Amount },

    #[error("percentages sum to {actual}, expected 100")]
    PercentageSumMismatch { actual: Amount },

    #[error("{0} cannot settle a debt with themselves")]
    SelfSettlement(MemberId),

    #[error("debt of {debtor} to {creditor} is {debt}, smaller than requested {requested}")]
    InsufficientDebt {
        debtor: MemberId,
        creditor: MemberId,
        debt: Amount,
        requested: Amount,
    },

    #[error("{member} holds {available}, needs {requested} to settle")]
    InsufficientFunds {
        member: MemberId,
        available: Amount,
        requested: Amount,
    },

    #[error("{member} authorised {allowance} to the ledger, needs {requested} to settle")]
    InsufficientAuthorization {
        member: MemberId,
        allowance: Amount,
        requested: Amount,
    },

    #[error("{member} already belongs to group {group}")]
    AlreadyMember { group: GroupId, member: MemberId },

    #[error("{member} already requested to join group {group}")]
    AlreadyRequested { group: GroupId, member: MemberId },

    #[error("{member} has not requested to join group {group}")]
    NoSuchRequest { group: GroupId, member: MemberId },

    #[error("{0} appears more than once in the balances")]
    DuplicateMember(MemberId),

    #[error("balances do not sum to zero")]
    UnbalancedBalances,

    #[error("value transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_parties() {
        let err = LedgerError::InsufficientDebt {
            debtor: MemberId::new("alice"),
            creditor: MemberId::new("bob"),
            debt: 4,
            requested: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("alice"));
        assert!(msg.contains("bob"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_transfer_error_converts() {
        let err: LedgerError = TransferError::Timeout { timeout_ms: 50 }.into();
        assert!(matches!(err, LedgerError::TransferFailed(TransferError::Timeout { .. })));
    }
}
