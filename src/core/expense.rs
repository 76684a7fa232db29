use crate::core::amount::Amount;
use crate::core::group::GroupId;
use crate::core::member::MemberId;
use crate::split::method::SplitKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an expense, sequential within its group starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(u64);

impl ExpenseId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The portion of an expense charged to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub member: MemberId,
    pub amount: Amount,
}

/// A registered expense.
///
/// Records that `payer` paid `amount` on behalf of the listed participants,
/// each of whom owes the payer their share. Expenses are immutable once
/// registered: simplification and settlement rewrite the debt table, never
/// the history.
///
/// # Examples
///
/// ```
/// use group_ledger::core::expense::{Expense, ExpenseId, Share};
/// use group_ledger::core::group::GroupId;
/// use group_ledger::core::member::MemberId;
/// use group_ledger::split::method::SplitKind;
///
/// let expense = Expense::new(
///     ExpenseId::new(1),
///     GroupId::new(1),
///     "Dinner",
///     MemberId::new("alice"),
///     90,
///     SplitKind::Equal,
///     vec![
///         Share { member: MemberId::new("alice"), amount: 45 },
///         Share { member: MemberId::new("bob"), amount: 45 },
///     ],
/// );
///
/// assert_eq!(expense.owed_to_payer(), 45);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    id: ExpenseId,
    group: GroupId,
    description: String,
    payer: MemberId,
    amount: Amount,
    method: SplitKind,
    shares: Vec<Share>,
    created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        id: ExpenseId,
        group: GroupId,
        description: impl Into<String>,
        payer: MemberId,
        amount: Amount,
        method: SplitKind,
        shares: Vec<Share>,
    ) -> Self {
        debug_assert_eq!(shares.iter().map(|s| s.amount).sum::<Amount>(), amount);
        Self {
            id,
            group,
            description: description.into(),
            payer,
            amount,
            method,
            shares,
            created_at: Utc::now(),
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn payer(&self) -> &MemberId {
        &self.payer
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn method(&self) -> SplitKind {
        self.method
    }

    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Participants in split order.
    pub fn participants(&self) -> Vec<MemberId> {
        self.shares.iter().map(|s| s.member.clone()).collect()
    }

    /// Total owed to the payer by the other participants.
    pub fn owed_to_payer(&self) -> Amount {
        self.shares
            .iter()
            .filter(|s| s.member != self.payer)
            .map(|s| s.amount)
            .sum()
    }
}
