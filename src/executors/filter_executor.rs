use super::eval::evaluate;
use super::Executor;
use crate::catalog::schema::Schema;
use crate::error::Result;
use crate::parser::ast::Expr;
use crate::tuple::Tuple;

/// Passes through only the tuples for which the predicate holds.
pub struct FilterExecutor {
    child: Box<dyn Executor>,
    predicate: Expr,
}

impl FilterExecutor {
    pub fn new(child: Box<dyn Executor>, predicate: Expr) -> Self {
        Self { child, predicate }
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>> {
        loop {
            match self.child.next().transpose()? {
                None => return Ok(None),
                Some(tuple) => {
                    if evaluate(&tuple, &self.predicate, self.child.schema())? {
                        return Ok(Some(tuple));
                    }
                }
            }
        }
    }
}

impl Executor for FilterExecutor {
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
        self.child.schema()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::executors::tests::TestDb;

    #[test]
    fn filters_keep_only_matching_rows() {
        let db = TestDb::new();
        db.execute("create table items (name STRING, count INT)").unwrap();
        db.execute("insert into items values ('foo', 1)").unwrap();
        db.execute("insert into items values ('bar', 2)").unwrap();
        db.execute("insert into items values ('baz', 3)").unwrap();

        let rows = db.execute("select * from items where count > 1").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].as_str(0), "bar");
        assert_eq!(rows[1].as_str(0), "baz");
    }

    #[test]
    fn predicate_errors_bubble_out_of_next() {
        let db = TestDb::new();
        db.execute("create table items (name STRING)").unwrap();
        db.execute("insert into items values ('foo')").unwrap();

        let err = db
            .execute("select * from items where missing = 1")
            .unwrap_err();
        assert!(matches!(err, DbError::ColumnMissing(_)));
    }
}
