use super::eval::evaluate;
use super::Executor;
use crate::catalog::schema::Schema;
use crate::error::Result;
use crate::parser::ast::Expr;
use crate::tuple::Tuple;

/// Joins two children by restarting the inner child for every outer tuple.
/// The join condition is evaluated against the concatenated tuple; the
/// output schema is outer ++ inner. The inner child must support close
/// followed by a fresh open.
pub struct NestedLoopJoinExecutor {
    left: Box<dyn Executor>,
    right: Box<dyn Executor>,
    on: Expr,
    schema: Schema,
    outer: Option<Tuple>,
}

impl NestedLoopJoinExecutor {
    pub fn new(left: Box<dyn Executor>, right: Box<dyn Executor>, on: Expr) -> Self {
        let columns = [left.schema().columns(), right.schema().columns()].concat();
        Self {
            left,
            right,
            on,
            schema: Schema::new(columns),
            outer: None,
        }
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>> {
        loop {
            let outer = match &self.outer {
                Some(outer) => outer,
                None => return Ok(None),
            };

            match self.right.next().transpose()? {
                Some(inner) => {
                    let mut values = outer.values().to_vec();
                    values.extend_from_slice(inner.values());
                    let combined = Tuple::new(values);
                    if evaluate(&combined, &self.on, &self.schema)? {
                        return Ok(Some(combined));
                    }
                }
                None => {
                    self.outer = self.left.next().transpose()?;
                    if self.outer.is_none() {
                        return Ok(None);
                    }
                    self.right.close()?;
                    self.right.open()?;
                }
            }
        }
    }
}

impl Executor for NestedLoopJoinExecutor {
    fn open(&mut self) -> Result<()> {
        self.left.open()?;
        self.right.open()?;
        self.outer = self.left.next().transpose()?;
        Ok(())
    }

    fn next(&mut self) -> Option<Result<Tuple>> {
        self.fetch_next().transpose()
    }

    fn close(&mut self) -> Result<()> {
        self.left.close()?;
        self.right.close()?;
        self.outer = None;
        Ok(())
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
