use crate::core::amount::{is_valid_amount, Amount};
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::event::GroupEvent;
use crate::core::group::Group;
use crate::core::member::MemberId;
use crate::core::settlement::SettlementRecord;
use crate::settlement::transfer::ValueTransfer;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Applies debt repayments.
///
/// A settlement is two-phase: the value moves through the external service
/// first, and the ledger is only touched once that transfer is confirmed.
/// A failed or unconfirmed transfer leaves the group exactly as it was.
#[derive(Clone)]
pub struct SettlementProcessor {
    transfer: Arc<dyn ValueTransfer>,
    /// Identity the ledger spends allowances as.
    operator: MemberId,
    timeout: Duration,
}

impl SettlementProcessor {
    pub fn new(transfer: Arc<dyn ValueTransfer>, operator: MemberId, timeout: Duration) -> Self {
        Self {
            transfer,
            operator,
            timeout,
        }
    }

    pub fn operator(&self) -> &MemberId {
        &self.operator
    }

    /// `payer` repays `amount` of what they owe `payee` in `group`.
    pub fn settle(
        &self,
        group: &mut Group,
        payer: &MemberId,
        payee: &MemberId,
        amount: Amount,
    ) -> LedgerResult<SettlementRecord> {
        if let Err(err) = self.validate(group, payer, payee, amount) {
            warn!(
                "settlement {} -> {} of {} in group {} rejected: {}",
                payer,
                payee,
                amount,
                group.id(),
                err
            );
            return Err(err);
        }

        if let Err(err) = self
            .transfer
            .transfer_from(&self.operator, payer, payee, amount, self.timeout)
        {
            warn!(
                "transfer {} -> {} of {} in group {} failed: {}",
                payer,
                payee,
                amount,
                group.id(),
                err
            );
            return Err(err.into());
        }

        group.ledger_mut().reduce_debt(payer, payee, amount)?;
        let record = SettlementRecord::new(group.id(), payer.clone(), payee.clone(), amount);
        group.push_settlement(record.clone());
        group.record(GroupEvent::DebtSettled {
            group: group.id(),
            from: payer.clone(),
            to: payee.clone(),
            amount,
        });
        info!(
            "{} settled {} with {} in group {}",
            payer,
            amount,
            payee,
            group.id()
        );
        Ok(record)
    }

    fn validate(
        &self,
        group: &Group,
        payer: &MemberId,
        payee: &MemberId,
        amount: Amount,
    ) -> LedgerResult<()> {
        if !is_valid_amount(amount) {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if payer == payee {
            return Err(LedgerError::SelfSettlement(payer.clone()));
        }
        group.ensure_member(payer)?;
        group.ensure_member(payee)?;

        let debt = group.ledger().debt_between(payer, payee);
        if amount > debt {
            return Err(LedgerError::InsufficientDebt {
                debtor: payer.clone(),
                creditor: payee.clone(),
                debt,
                requested: amount,
            });
        }

        let available = self.transfer.balance_of(payer);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                member: payer.clone(),
                available,
                requested: amount,
            });
        }

        let allowance = self.transfer.allowance(payer, &self.operator);
        if allowance < amount {
            return Err(LedgerError::InsufficientAuthorization {
                member: payer.clone(),
                allowance,
                requested: amount,
            });
        }
        Ok(())
    }
}
