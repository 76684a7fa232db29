//! Integer money types.
//!
//! Every quantity in the engine is an integer number of the smallest
//! token unit. There is no floating point anywhere in the accounting path.

/// A non-negative quantity: expense totals, shares, debts, transfers.
pub type Amount = u128;

/// A signed net position. Positive = owed money, negative = owes money.
pub type Balance = i128;

/// Largest amount accepted for a single expense or settlement.
///
/// Keeps `amount * 100` (percentage splits) and every conversion into
/// [`Balance`] well inside `i128`.
pub const MAX_AMOUNT: Amount = 1_000_000_000_000_000_000_000_000_000_000;

/// Convert an amount already bounded by [`MAX_AMOUNT`] into a balance delta.
pub(crate) fn as_balance(amount: Amount) -> Balance {
    debug_assert!(amount <= MAX_AMOUNT);
    amount as Balance
}

/// Convert an accumulated amount, such as a stored debt, into a balance.
///
/// Debts grow with every expense and are not bounded by [`MAX_AMOUNT`].
/// Values past `Balance::MAX` saturate.
pub(crate) fn total_as_balance(amount: Amount) -> Balance {
    Balance::try_from(amount).unwrap_or(Balance::MAX)
}

/// Whether `amount` is usable as an expense or settlement amount.
pub fn is_valid_amount(amount: Amount) -> bool {
    amount > 0 && amount <= MAX_AMOUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_bounds() {
        assert!(!is_valid_amount(0));
        assert!(is_valid_amount(1));
        assert!(is_valid_amount(MAX_AMOUNT));
        assert!(!is_valid_amount(MAX_AMOUNT + 1));
    }

    #[test]
    fn test_accumulated_amounts_convert_past_max() {
        assert_eq!(total_as_balance(7), 7);
        assert_eq!(total_as_balance(MAX_AMOUNT * 3), (MAX_AMOUNT * 3) as Balance);
        assert_eq!(total_as_balance(Amount::MAX), Balance::MAX);
    }

    #[test]
    fn test_percentage_headroom() {
        assert!(MAX_AMOUNT.checked_mul(100).is_some());
        assert!((MAX_AMOUNT * 100) < i128::MAX as u128);
    }
}
