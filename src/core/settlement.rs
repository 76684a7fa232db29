use crate::core::amount::Amount;
use crate::core::group::GroupId;
use crate::core::member::MemberId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit record of a completed repayment.
///
/// Written once the external transfer is confirmed and the debt reduced.
/// Records are append-only and never read back by the accounting logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRecord {
    id: Uuid,
    group: GroupId,
    payer: MemberId,
    payee: MemberId,
    amount: Amount,
    settled_at: DateTime<Utc>,
}

impl SettlementRecord {
    pub fn new(group: GroupId, payer: MemberId, payee: MemberId, amount: Amount) -> Self {
        Self {
            id: Uuid::new_v4(),
            group,
            payer,
            payee,
            amount,
            settled_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn payer(&self) -> &MemberId {
        &self.payer
    }

    pub fn payee(&self) -> &MemberId {
        &self.payee
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn settled_at(&self) -> DateTime<Utc> {
        self.settled_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_get_distinct_ids() {
        let a = SettlementRecord::new(GroupId::new(1), "alice".into(), "bob".into(), 4);
        let b = SettlementRecord::new(GroupId::new(1), "alice".into(), "bob".into(), 4);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.amount(), 4);
        assert_eq!(a.payee().as_str(), "bob");
    }
}
