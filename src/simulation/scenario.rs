//! Scripted scenarios and the replay driver behind `group-ledger replay`.
//!
//! A scenario funds wallets on an in-memory token, then runs a list of
//! operations against a fresh engine. Groups are numbered in creation
//! order starting at 1, so steps refer to them by id.

use crate::config::EngineConfig;
use crate::core::amount::Amount;
use crate::core::error::LedgerError;
use crate::core::group::{GroupId, MemberBalance};
use crate::core::member::MemberId;
use crate::ledger::debt_graph::DebtEdge;
use crate::service::ledger_service::LedgerService;
use crate::split::method::{SplitKind, SplitMethod};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Starting token holdings of one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub member: MemberId,
    pub deposit: Amount,
    /// Allowance granted to the engine's operator.
    #[serde(default)]
    pub allowance: Amount,
}

/// One engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CreateGroup {
        creator: MemberId,
        name: String,
        #[serde(default)]
        invitees: Vec<MemberId>,
    },
    RequestToJoin {
        group: GroupId,
        member: MemberId,
    },
    Approve {
        group: GroupId,
        approver: MemberId,
        member: MemberId,
    },
    Reject {
        group: GroupId,
        approver: MemberId,
        member: MemberId,
    },
    RegisterExpense {
        group: GroupId,
        payer: MemberId,
        #[serde(default)]
        description: String,
        amount: Amount,
        participants: Vec<MemberId>,
        method: SplitKind,
        #[serde(default)]
        values: Vec<Amount>,
    },
    Simplify {
        group: GroupId,
        caller: MemberId,
    },
    Settle {
        group: GroupId,
        payer: MemberId,
        payee: MemberId,
        amount: Amount,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub wallets: Vec<Wallet>,
    pub steps: Vec<Step>,
}

/// Replay stopped at a failing step.
#[derive(Debug, Error)]
#[error("step {index} failed: {source}")]
pub struct ReplayError {
    pub index: usize,
    #[source]
    pub source: LedgerError,
}

/// End state of one group after a replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    pub members: Vec<MemberId>,
    pub balances: Vec<MemberBalance>,
    pub debts: Vec<DebtEdge>,
    pub expenses: usize,
    pub settlements: usize,
}

impl fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Group {} \"{}\" ===", self.id, self.name)?;
        writeln!(f, "Expenses:    {}", self.expenses)?;
        writeln!(f, "Settlements: {}", self.settlements)?;
        writeln!(f, "Balances:")?;
        for entry in &self.balances {
            let status = match entry.balance {
                b if b > 0 => "CREDITOR",
                b if b < 0 => "DEBTOR",
                _ => "SETTLED",
            };
            writeln!(f, "  {:<20} {:>12}  {}", entry.member.as_str(), entry.balance, status)?;
        }
        if self.debts.is_empty() {
            writeln!(f, "Debts:       none")?;
        } else {
            writeln!(f, "Debts:")?;
            for edge in &self.debts {
                writeln!(f, "  {}", edge)?;
            }
        }
        Ok(())
    }
}

/// Run `scenario` against a fresh in-memory engine.
///
/// Wallets are funded first, with allowances granted to the configured
/// operator. Steps run in order and replay stops at the first failure.
pub fn replay(scenario: &Scenario, config: EngineConfig) -> Result<Vec<GroupSummary>, ReplayError> {
    let (ledger, token) = LedgerService::in_memory(config);
    for wallet in &scenario.wallets {
        token.deposit(&wallet.member, wallet.deposit);
        token.approve(&wallet.member, ledger.operator(), wallet.allowance);
    }

    let mut created = Vec::new();
    for (index, step) in scenario.steps.iter().enumerate() {
        debug!("replay step {}: {:?}", index, step);
        apply(&ledger, step, &mut created).map_err(|source| ReplayError { index, source })?;
    }

    created
        .into_iter()
        .map(|(id, creator)| summarize(&ledger, id, &creator))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ReplayError {
            index: scenario.steps.len(),
            source,
        })
}

fn apply(
    ledger: &LedgerService,
    step: &Step,
    created: &mut Vec<(GroupId, MemberId)>,
) -> Result<(), LedgerError> {
    match step {
        Step::CreateGroup {
            creator,
            name,
            invitees,
        } => {
            let id = ledger.create_group(creator, name, invitees);
            created.push((id, creator.clone()));
        }
        Step::RequestToJoin { group, member } => ledger.request_to_join(*group, member)?,
        Step::Approve {
            group,
            approver,
            member,
        } => ledger.approve(*group, approver, member)?,
        Step::Reject {
            group,
            approver,
            member,
        } => ledger.reject(*group, approver, member)?,
        Step::RegisterExpense {
            group,
            payer,
            description,
            amount,
            participants,
            method,
            values,
        } => {
            let method = SplitMethod::from_parts(*method, values.clone());
            ledger.register_expense(*group, payer, description, *amount, participants, method)?;
        }
        Step::Simplify { group, caller } => {
            ledger.simplify(*group, caller)?;
        }
        Step::Settle {
            group,
            payer,
            payee,
            amount,
        } => {
            ledger.settle(*group, payer, payee, *amount)?;
        }
    }
    Ok(())
}

fn summarize(
    ledger: &LedgerService,
    id: GroupId,
    caller: &MemberId,
) -> Result<GroupSummary, LedgerError> {
    let view = ledger.retrieve_group(id, caller)?;
    Ok(GroupSummary {
        id,
        name: view.name,
        members: view.members,
        balances: view.balances,
        debts: ledger.debts(id, caller)?,
        expenses: ledger.expense_history(id, caller)?.len(),
        settlements: ledger.settlement_history(id, caller)?.len(),
    })
}
