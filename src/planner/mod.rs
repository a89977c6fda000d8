use std::sync::Arc;

use dashmap::DashMap;

use crate::catalog::schema::Table;
use crate::catalog::Catalog;
use crate::error::{DbError, Result};
use crate::executors::{
    DeleteExecutor, Executor, FilterExecutor, IndexScanExecutor, InsertExecutor,
    NestedLoopJoinExecutor, ProjectionExecutor, SeqScanExecutor, UpdateExecutor,
};
use crate::indexing::{index_key, HashIndex};
use crate::parser::ast::{
    BinaryOperator, Expr, Literal, SelectStatement, Statement,
};
use crate::storage::engine::Engine;
use crate::storage::heap::HeapFile;
use crate::tuple::deserialize_tuple;
use crate::tuple::value::Value;

/// Turns parsed statements into executor trees. Holds the catalog, the
/// storage engine and the registry of live hash indexes, keyed as
/// "table.column". The registry is shared with every insert, update and
/// delete plan so index maintenance and planning see the same objects.
pub struct Planner {
    catalog: Arc<Catalog>,
    engine: Arc<Engine>,
    indexes: Arc<DashMap<String, Arc<HashIndex>>>,
}

impl Planner {
    pub fn new(catalog: Arc<Catalog>, engine: Arc<Engine>) -> Self {
        Self {
            catalog,
            engine,
            indexes: Arc::new(DashMap::new()),
        }
    }

    /// Looks up the live index on a column, if one has been built.
    pub fn index(&self, table: &str, column: &str) -> Option<Arc<HashIndex>> {
        self.indexes
            .get(&index_key(table, column))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Re-creates every declared index and populates it from a full heap
    /// scan. Must run before the first query and after CREATE INDEX.
    pub fn rebuild_indices(&self) -> Result<()> {
        for table_name in self.catalog.table_names() {
            let table = match self.catalog.get_table(&table_name) {
                Some(table) => table,
                None => continue,
            };
            if table.indexes.is_empty() {
                continue;
            }

            let heap = self.engine.get_heap_file(&table.name)?;
            for def in &table.indexes {
                self.indexes.insert(
                    index_key(&table.name, &def.column),
                    Arc::new(HashIndex::new()),
                );
            }

            let schema = table.schema();
            let mut iter = heap.iter();
            while let Some((bytes, rid)) = iter.next()? {
                let tuple = deserialize_tuple(&bytes, &schema)?;
                for (idx, column) in schema.columns().iter().enumerate() {
                    if let Some(index) = self.indexes.get(&index_key(&table.name, &column.name)) {
                        index.insert(tuple.values()[idx].clone(), rid);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn create_plan(&self, statement: Statement) -> Result<Box<dyn Executor>> {
        match statement {
            Statement::Select(select) => self.plan_select(select),
            Statement::Insert { table, values, .. } => self.plan_insert(&table, values),
            Statement::Update {
                table,
                assignments,
                filter,
            } => self.plan_update(&table, assignments, filter),
            Statement::Delete { table, filter } => self.plan_delete(&table, filter),
            Statement::CreateTable { .. } | Statement::CreateIndex { .. } => Err(
                DbError::Syntax("DDL statements are applied directly, not planned".to_owned()),
            ),
        }
    }

    fn plan_select(&self, select: SelectStatement) -> Result<Box<dyn Executor>> {
        let SelectStatement {
            table: table_name,
            fields,
            join,
            filter,
        } = select;

        let table = self
            .catalog
            .get_table(&table_name)
            .ok_or_else(|| DbError::TableMissing(table_name.clone()))?;
        let heap = self.engine.get_heap_file(&table_name)?;
        let schema = table.schema().qualified(&table_name);

        let index_scan = filter
            .as_ref()
            .and_then(|expr| self.choose_index_scan(&table, expr));
        let mut root: Box<dyn Executor> = match index_scan {
            Some((index, key)) => Box::new(IndexScanExecutor::new(index, heap, key, schema)),
            None => Box::new(SeqScanExecutor::new(heap, schema)),
        };

        if let Some(join) = join {
            let right_table = self
                .catalog
                .get_table(&join.table)
                .ok_or_else(|| DbError::TableMissing(join.table.clone()))?;
            let right_heap = self.engine.get_heap_file(&join.table)?;
            let right = SeqScanExecutor::new(
                right_heap,
                right_table.schema().qualified(&join.table),
            );
            root = Box::new(NestedLoopJoinExecutor::new(root, Box::new(right), join.on));
        }

        // applied even above an index scan, so composite predicates stay
        // correct when the rewrite fires on their equality half
        if let Some(filter) = filter {
            root = Box::new(FilterExecutor::new(root, filter));
        }

        if !(fields.len() == 1 && fields[0] == "*") {
            root = Box::new(ProjectionExecutor::new(root, &fields)?);
        }

        Ok(root)
    }

    /// The single rewrite: a WHERE of exactly `column = literal` over an
    /// indexed column, with a literal that casts to the column's type,
    /// becomes an index lookup.
    fn choose_index_scan(&self, table: &Table, filter: &Expr) -> Option<(Arc<HashIndex>, Value)> {
        if let Expr::Binary {
            left,
            op: BinaryOperator::Eq,
            right,
        } = filter
        {
            if let (Expr::Identifier(name), Expr::Literal(literal)) = (&**left, &**right) {
                let column = table.columns.iter().find(|col| col.name == *name)?;
                let key = Value::cast_literal(literal, column.column_type).ok()?;
                let index = self.index(&table.name, &column.name)?;
                return Some((index, key));
            }
        }
        None
    }

    fn plan_insert(&self, table_name: &str, values: Vec<Literal>) -> Result<Box<dyn Executor>> {
        let table = self
            .catalog
            .get_table(table_name)
            .ok_or_else(|| DbError::TableMissing(table_name.to_owned()))?;
        let heap = self.engine.get_heap_file(table_name)?;
        let schema = table.schema().qualified(table_name);

        Ok(Box::new(InsertExecutor::new(
            heap,
            vec![values],
            schema,
            table_name.to_owned(),
            Arc::clone(&self.indexes),
        )))
    }

    fn plan_update(
        &self,
        table_name: &str,
        assignments: Vec<(String, Literal)>,
        filter: Option<Expr>,
    ) -> Result<Box<dyn Executor>> {
        let (heap, child) = self.plan_modify_source(table_name, filter)?;
        Ok(Box::new(UpdateExecutor::new(
            heap,
            child,
            table_name.to_owned(),
            assignments,
            Arc::clone(&self.indexes),
        )))
    }

    fn plan_delete(&self, table_name: &str, filter: Option<Expr>) -> Result<Box<dyn Executor>> {
        let (heap, child) = self.plan_modify_source(table_name, filter)?;
        Ok(Box::new(DeleteExecutor::new(
            heap,
            child,
            table_name.to_owned(),
            Arc::clone(&self.indexes),
        )))
    }

    /// UPDATE and DELETE both read their victims through a sequential scan
    /// with an optional filter on top.
    fn plan_modify_source(
        &self,
        table_name: &str,
        filter: Option<Expr>,
    ) -> Result<(Arc<HeapFile>, Box<dyn Executor>)> {
        let table = self
            .catalog
            .get_table(table_name)
            .ok_or_else(|| DbError::TableMissing(table_name.to_owned()))?;
        let heap = self.engine.get_heap_file(table_name)?;

        let mut child: Box<dyn Executor> =
            Box::new(SeqScanExecutor::new(Arc::clone(&heap), table.schema()));
        if let Some(filter) = filter {
            child = Box::new(FilterExecutor::new(child, filter));
        }

        Ok((heap, child))
    }
}
