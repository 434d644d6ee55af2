//! Tuples and their metadata.

use crate::types::Value;

/// A row of values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn value(&self, idx: usize) -> &Value {
        &self.values[idx]
    }

    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.values.len()
    }

    /// Project the key columns named by `key_attrs` into a key tuple.
    pub fn key_from_tuple(&self, key_attrs: &[usize]) -> Tuple {
        Tuple::new(
            key_attrs
                .iter()
                .map(|&idx| self.values[idx].clone())
                .collect(),
        )
    }
}

/// Per-row metadata kept by the table heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TupleMeta {
    /// Tombstone flag: a deleted row stays in its slot but is logically
    /// absent.
    pub is_deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_tuple() {
        let tuple = Tuple::new(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3),
        ]);
        let key = tuple.key_from_tuple(&[2, 0]);
        assert_eq!(key.values(), &[Value::Integer(3), Value::Integer(1)]);
    }
}
