use super::Executor;
use crate::catalog::schema::Schema;
use crate::error::{DbError, Result};
use crate::tuple::Tuple;

/// Maps the child's columns onto the requested field list by bare or
/// qualified name.
pub struct ProjectionExecutor {
    child: Box<dyn Executor>,
    mapping: Vec<usize>,
    schema: Schema,
}

impl ProjectionExecutor {
    pub fn new(child: Box<dyn Executor>, fields: &[String]) -> Result<Self> {
        let input = child.schema();
        let mut mapping = Vec::with_capacity(fields.len());
        let mut columns = Vec::with_capacity(fields.len());

        for field in fields {
            let (idx, column) = input
                .find_column(field)
                .ok_or_else(|| DbError::ColumnMissing(field.clone()))?;
            mapping.push(idx);
            columns.push(column.clone());
        }

        Ok(Self {
            child,
            mapping,
            schema: Schema::new(columns),
        })
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>> {
        match self.child.next().transpose()? {
            None => Ok(None),
            Some(tuple) => {
                let values = self
                    .mapping
                    .iter()
                    .map(|idx| tuple.values()[*idx].clone())
                    .collect();
                Ok(Some(Tuple::new(values)))
            }
        }
    }
}

impl Executor for ProjectionExecutor {
    fn open(&mut self) -> Result<()> {
        self.child.open()
    }

    fn next(&mut self) -> Option<Result<Tuple>> {
        self.fetch_next().transpose()
    }

    fn close(&mut self) -> Result<()> {
        self.child.close()
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
