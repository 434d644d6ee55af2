//! Values executor - emits literal rows.

use crate::catalog::Schema;
use crate::common::{Result, Rid};
use crate::execution::executor::Executor;
use crate::types::{Tuple, Value};

/// Emits a fixed list of rows; the usual source below an insert.
pub struct ValuesExecutor {
    rows: Vec<Vec<Value>>,
    schema: Schema,
    cursor: usize,
}

impl ValuesExecutor {
    pub fn new(rows: Vec<Vec<Value>>, schema: Schema) -> Self {
        Self {
            rows,
            schema,
            cursor: 0,
        }
    }
}

impl Executor for ValuesExecutor {
    fn init(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        if self.cursor >= self.rows.len() {
            return Ok(None);
        }
        let tuple = Tuple::new(self.rows[self.cursor].clone());
        self.cursor += 1;
        Ok(Some((tuple, Rid::INVALID)))
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emits_rows_then_stops() {
        let mut exec = ValuesExecutor::new(
            vec![vec![Value::Integer(1)], vec![Value::Integer(2)]],
            Schema::from_names(&["a"]),
        );
        exec.init().unwrap();

        assert_eq!(
            exec.next().unwrap().unwrap().0.value(0),
            &Value::Integer(1)
        );
        assert_eq!(
            exec.next().unwrap().unwrap().0.value(0),
            &Value::Integer(2)
        );
        assert!(exec.next().unwrap().is_none());
        assert!(exec.next().unwrap().is_none());
    }
}
