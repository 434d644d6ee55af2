//! Runtime values flowing through the executors.

use std::fmt;

/// A single column value.
///
/// The derived ordering places `Null` before everything else, which is
/// what the sort executors rely on; cross-variant comparisons follow the
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness for predicate evaluation. `Null` is not true.
    #[inline]
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Boolean(true))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_null_first() {
        assert!(Value::Null < Value::Boolean(false));
        assert!(Value::Boolean(true) < Value::Integer(i64::MIN));
        assert!(Value::Integer(1) < Value::Integer(2));
    }

    #[test]
    fn test_is_true() {
        assert!(Value::Boolean(true).is_true());
        assert!(!Value::Boolean(false).is_true());
        assert!(!Value::Null.is_true());
        assert!(!Value::Integer(1).is_true());
    }
}
