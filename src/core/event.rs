use crate::core::amount::Amount;
use crate::core::expense::ExpenseId;
use crate::core::group::GroupId;
use crate::core::member::MemberId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Something that happened to a group, in the order it happened.
///
/// Clients mirror ledger state from this log instead of polling.
///
/// Externally tagged in JSON (`{"debt_settled": {...}}`) so amounts above
/// `u64::MAX` survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupEvent {
    GroupCreated {
        group: GroupId,
        name: String,
        creator: MemberId,
    },
    RequestToJoin {
        group: GroupId,
        member: MemberId,
    },
    UserApproved {
        group: GroupId,
        member: MemberId,
    },
    UserRejected {
        group: GroupId,
        member: MemberId,
    },
    ExpenseRegistered {
        group: GroupId,
        expense: ExpenseId,
        payer: MemberId,
        amount: Amount,
        description: String,
        participants: Vec<MemberId>,
        shares: Vec<Amount>,
    },
    DebtSimplified {
        group: GroupId,
        edges_before: usize,
        edges_after: usize,
    },
    DebtSettled {
        group: GroupId,
        from: MemberId,
        to: MemberId,
        amount: Amount,
    },
}

impl GroupEvent {
    pub fn group(&self) -> GroupId {
        match self {
            GroupEvent::GroupCreated { group, .. }
            | GroupEvent::RequestToJoin { group, .. }
            | GroupEvent::UserApproved { group, .. }
            | GroupEvent::UserRejected { group, .. }
            | GroupEvent::ExpenseRegistered { group, .. }
            | GroupEvent::DebtSimplified { group, .. }
            | GroupEvent::DebtSettled { group, .. } => *group,
        }
    }
}

/// An event stamped with the time it was recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub at: DateTime<Utc>,
    pub event: GroupEvent,
}

impl RecordedEvent {
    pub fn now(event: GroupEvent) -> Self {
        Self {
            at: Utc::now(),
            event,
        }
    }
}
