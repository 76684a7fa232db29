use crate::core::amount::Amount;
use crate::core::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which rule divides an expense. Carried on the expense record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    Equal,
    Exact,
    Percentage,
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SplitKind::Equal => "EQUAL",
            SplitKind::Exact => "EXACT",
            SplitKind::Percentage => "PERCENTAGE",
        };
        write!(f, "{}", s)
    }
}

/// A split rule together with its per-participant values.
///
/// `Exact` values are amounts, `Percentage` values are whole percentages.
/// Both lists are parallel to the participant list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMethod {
    Equal,
    Exact(Vec<Amount>),
    Percentage(Vec<Amount>),
}

impl SplitMethod {
    /// Rebuild a method from the flat `(kind, values)` form used on the wire.
    ///
    /// `values` is ignored for `Equal`.
    pub fn from_parts(kind: SplitKind, values: Vec<Amount>) -> Self {
        match kind {
            SplitKind::Equal => SplitMethod::Equal,
            SplitKind::Exact => SplitMethod::Exact(values),
            SplitKind::Percentage => SplitMethod::Percentage(values),
        }
    }

    pub fn kind(&self) -> SplitKind {
        match self {
            SplitMethod::Equal => SplitKind::Equal,
            SplitMethod::Exact(_) => SplitKind::Exact,
            SplitMethod::Percentage(_) => SplitKind::Percentage,
        }
    }

    /// Check that the value list matches `participants` in length.
    pub(crate) fn check_arity(&self, participants: usize) -> LedgerResult<()> {
        match self {
            SplitMethod::Equal => Ok(()),
            SplitMethod::Exact(values) | SplitMethod::Percentage(values) => {
                if values.len() == participants {
                    Ok(())
                } else {
                    Err(LedgerError::MismatchedSplitArity {
                        participants,
                        values: values.len(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_drops_values_for_equal() {
        assert_eq!(
            SplitMethod::from_parts(SplitKind::Equal, vec![1, 2]),
            SplitMethod::Equal
        );
        assert_eq!(
            SplitMethod::from_parts(SplitKind::Percentage, vec![20, 80]).kind(),
            SplitKind::Percentage
        );
    }

    #[test]
    fn test_arity_check() {
        let method = SplitMethod::Exact(vec![50, 50]);
        assert!(method.check_arity(2).is_ok());
        assert!(matches!(
            method.check_arity(3),
            Err(LedgerError::MismatchedSplitArity {
                participants: 3,
                values: 2
            })
        ));
        assert!(SplitMethod::Equal.check_arity(5).is_ok());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SplitKind::Percentage).unwrap(),
            "\"percentage\""
        );
    }
}
