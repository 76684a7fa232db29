use crate::core::amount::{is_valid_amount, Amount};
use crate::core::error::{LedgerError, LedgerResult};
use crate::split::method::SplitMethod;

/// Computes per-participant shares of an expense.
///
/// Shares always sum to the expense amount exactly. Rounding residue is
/// assigned by a fixed rule per method, never lost and never invented.
pub struct ExpenseSplitter;

impl ExpenseSplitter {
    /// Split `amount` across `participants` participants.
    ///
    /// Returns one share per participant, in participant order.
    ///
    /// # Rules
    ///
    /// - `Equal`: `amount / n` each, the first `amount % n` participants get one more.
    /// - `Exact`: the values verbatim; they must sum to `amount`.
    /// - `Percentage`: values must sum to 100. Every participant but the last
    ///   gets `amount * pct / 100` rounded half up; the last gets whatever is left.
    ///
    /// # Examples
    ///
    /// ```
    /// use group_ledger::split::method::SplitMethod;
    /// use group_ledger::split::splitter::ExpenseSplitter;
    ///
    /// let shares = ExpenseSplitter::split(8, 3, &SplitMethod::Equal).unwrap();
    /// assert_eq!(shares, vec![3, 3, 2]);
    ///
    /// let shares = ExpenseSplitter::split(8, 2, &SplitMethod::Percentage(vec![20, 80])).unwrap();
    /// assert_eq!(shares, vec![2, 6]);
    /// ```
    pub fn split(
        amount: Amount,
        participants: usize,
        method: &SplitMethod,
    ) -> LedgerResult<Vec<Amount>> {
        if !is_valid_amount(amount) {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if participants == 0 {
            return Err(LedgerError::NoParticipants);
        }
        method.check_arity(participants)?;

        match method {
            SplitMethod::Equal => Ok(Self::split_equal(amount, participants)),
            SplitMethod::Exact(values) => Self::split_exact(amount, values),
            SplitMethod::Percentage(values) => Self::split_percentage(amount, values),
        }
    }

    fn split_equal(amount: Amount, participants: usize) -> Vec<Amount> {
        let n = participants as Amount;
        let base = amount / n;
        let remainder = (amount % n) as usize;
        (0..participants)
            .map(|i| if i < remainder { base + 1 } else { base })
            .collect()
    }

    fn split_exact(amount: Amount, values: &[Amount]) -> LedgerResult<Vec<Amount>> {
        // Saturate so absurd inputs report a mismatch instead of overflowing.
        let total = values
            .iter()
            .fold(0 as Amount, |acc, v| acc.saturating_add(*v));
        if total != amount {
            return Err(LedgerError::SplitSumMismatch {
                expected: amount,
                actual: total,
            });
        }
        Ok(values.to_vec())
    }

    fn split_percentage(amount: Amount, percentages: &[Amount]) -> LedgerResult<Vec<Amount>> {
        let total = percentages
            .iter()
            .fold(0 as Amount, |acc, v| acc.saturating_add(*v));
        if total != 100 {
            return Err(LedgerError::PercentageSumMismatch { actual: total });
        }

        let last = percentages.len() - 1;
        let mut shares = Vec::with_capacity(percentages.len());
        let mut assigned: Amount = 0;
        for pct in &percentages[..last] {
            // amount <= MAX_AMOUNT and pct <= 100, so this cannot overflow.
            let share = (amount * pct + 50) / 100;
            assigned += share;
            shares.push(share);
        }

        // Rounding every leading share up can overshoot tiny amounts.
        let rest = amount
            .checked_sub(assigned)
            .ok_or(LedgerError::InvalidAmount(amount))?;
        shares.push(rest);
        Ok(shares)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_even() {
        assert_eq!(
            ExpenseSplitter::split(90, 3, &SplitMethod::Equal).unwrap(),
            vec![30, 30, 30]
        );
    }

    #[test]
    fn test_equal_remainder_goes_to_first() {
        assert_eq!(
            ExpenseSplitter::split(8, 3, &SplitMethod::Equal).unwrap(),
            vec![3, 3, 2]
        );
        assert_eq!(
            ExpenseSplitter::split(2, 3, &SplitMethod::Equal).unwrap(),
            vec![1, 1, 0]
        );
    }

    #[test]
    fn test_equal_single_participant() {
        assert_eq!(
            ExpenseSplitter::split(8, 1, &SplitMethod::Equal).unwrap(),
            vec![8]
        );
    }

    #[test]
    fn test_exact_verbatim() {
        let method = SplitMethod::Exact(vec![20, 70]);
        assert_eq!(ExpenseSplitter::split(90, 2, &method).unwrap(), vec![20, 70]);
    }

    #[test]
    fn test_exact_sum_mismatch() {
        let method = SplitMethod::Exact(vec![30, 20, 10]);
        let err = ExpenseSplitter::split(90, 3, &method).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::SplitSumMismatch {
                expected: 90,
                actual: 60
            }
        ));
    }

    #[test]
    fn test_exact_arity_mismatch() {
        let method = SplitMethod::Exact(vec![50, 50]);
        let err = ExpenseSplitter::split(90, 3, &method).unwrap_err();
        assert!(matches!(err, LedgerError::MismatchedSplitArity { .. }));
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        let method = SplitMethod::Percentage(vec![20, 80]);
        assert_eq!(ExpenseSplitter::split(8, 2, &method).unwrap(), vec![2, 6]);

        let method = SplitMethod::Percentage(vec![30, 70]);
        assert_eq!(ExpenseSplitter::split(60, 2, &method).unwrap(), vec![18, 42]);
    }

    #[test]
    fn test_percentage_remainder_to_last() {
        // 9.35 -> 9, 19.25 -> 19, last takes 55 - 28
        let method = SplitMethod::Percentage(vec![17, 35, 48]);
        assert_eq!(
            ExpenseSplitter::split(55, 3, &method).unwrap(),
            vec![9, 19, 27]
        );
    }

    #[test]
    fn test_percentage_sum_mismatch() {
        let method = SplitMethod::Percentage(vec![20, 70]);
        let err = ExpenseSplitter::split(90, 2, &method).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::PercentageSumMismatch { actual: 90 }
        ));
    }

    #[test]
    fn test_percentage_overshoot_is_rejected() {
        let method = SplitMethod::Percentage(vec![50, 50, 0]);
        let err = ExpenseSplitter::split(1, 3, &method).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(1)));
    }

    #[test]
    fn test_zero_amount() {
        let err = ExpenseSplitter::split(0, 2, &SplitMethod::Equal).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(0)));
    }

    #[test]
    fn test_no_participants() {
        let err = ExpenseSplitter::split(10, 0, &SplitMethod::Equal).unwrap_err();
        assert!(matches!(err, LedgerError::NoParticipants));
    }
}
