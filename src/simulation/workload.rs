//! Random workload generation.
//!
//! Builds scenarios with one group and many expenses to exercise splitting,
//! netting and simplification at scale.

use crate::core::amount::{Amount, Balance};
use crate::core::group::GroupId;
use crate::core::member::MemberId;
use crate::simulation::scenario::{Scenario, Step};
use crate::split::method::{SplitKind, SplitMethod};
use crate::split::splitter::ExpenseSplitter;
use rand::seq::SliceRandom;
use rand::Rng;

/// Configuration for a random workload.
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    /// Number of members in the group, creator included.
    pub member_count: usize,
    pub expense_count: usize,
    pub min_amount: Amount,
    pub max_amount: Amount,
    /// Append a `simplify` step after the expenses.
    pub simplify: bool,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            member_count: 10,
            expense_count: 30,
            min_amount: 100,
            max_amount: 100_000,
            simplify: true,
        }
    }
}

/// Members named `MEMBER-000`, `MEMBER-001`, ...
pub fn member_names(count: usize) -> Vec<MemberId> {
    (0..count)
        .map(|i| MemberId::new(format!("MEMBER-{:03}", i)))
        .collect()
}

/// Generate a random scenario using the thread-local RNG.
pub fn generate_scenario(config: &WorkloadConfig) -> Scenario {
    generate_scenario_with(config, &mut rand::thread_rng())
}

/// Generate a random scenario from `rng`. The same seed gives the same scenario.
pub fn generate_scenario_with<R: Rng + ?Sized>(config: &WorkloadConfig, rng: &mut R) -> Scenario {
    let members = member_names(config.member_count.max(1));
    let group = GroupId::new(1);
    let mut steps = vec![Step::CreateGroup {
        creator: members[0].clone(),
        name: "Generated".to_string(),
        invitees: members[1..].to_vec(),
    }];

    let min = config.min_amount.max(1);
    let max = config.max_amount.max(min);
    for i in 0..config.expense_count {
        let payer = members[rng.gen_range(0..members.len())].clone();
        let count = rng.gen_range(1..=members.len());
        let participants: Vec<MemberId> = members.choose_multiple(rng, count).cloned().collect();
        let amount = rng.gen_range(min..=max);

        let (method, values) = match rng.gen_range(0..3) {
            0 => (SplitKind::Equal, Vec::new()),
            1 => (SplitKind::Exact, random_partition(rng, amount, participants.len())),
            _ => {
                let percentages = random_partition(rng, 100, participants.len());
                // Leading shares rounded up can overshoot small amounts.
                let method = SplitMethod::Percentage(percentages.clone());
                match ExpenseSplitter::split(amount, participants.len(), &method) {
                    Ok(_) => (SplitKind::Percentage, percentages),
                    Err(_) => (SplitKind::Equal, Vec::new()),
                }
            }
        };

        steps.push(Step::RegisterExpense {
            group,
            payer,
            description: format!("expense {}", i + 1),
            amount,
            participants,
            method,
            values,
        });
    }

    if config.simplify {
        steps.push(Step::Simplify {
            group,
            caller: members[0].clone(),
        });
    }

    Scenario {
        wallets: Vec::new(),
        steps,
    }
}

/// Split `total` into `parts` non-negative values summing to `total`.
pub fn random_partition<R: Rng + ?Sized>(rng: &mut R, total: Amount, parts: usize) -> Vec<Amount> {
    if parts == 0 {
        return Vec::new();
    }
    let mut cuts: Vec<Amount> = (0..parts - 1).map(|_| rng.gen_range(0..=total)).collect();
    cuts.sort_unstable();

    let mut values = Vec::with_capacity(parts);
    let mut previous = 0;
    for cut in cuts {
        values.push(cut - previous);
        previous = cut;
    }
    values.push(total - previous);
    values
}

/// Random balances for `count` members that sum to zero, in member order.
pub fn random_balances<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    max_magnitude: Amount,
) -> Vec<(MemberId, Balance)> {
    let members = member_names(count);
    if count == 0 {
        return Vec::new();
    }
    let bound = max_magnitude.min(Amount::from(u64::MAX)) as Balance;
    let mut balances: Vec<Balance> = (0..count - 1)
        .map(|_| rng.gen_range(-bound..=bound))
        .collect();
    let rest: Balance = balances.iter().sum();
    balances.push(-rest);
    members.into_iter().zip(balances).collect()
}
