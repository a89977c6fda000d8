use crate::catalog::schema::Schema;
use crate::error::Result;
use crate::tuple::Tuple;

pub mod eval;

mod delete_executor;
mod filter_executor;
mod index_scan_executor;
mod insert_executor;
mod nested_loop_join_executor;
mod projection_executor;
mod seq_scan_executor;
mod update_executor;

pub use self::delete_executor::DeleteExecutor;
pub use self::filter_executor::FilterExecutor;
pub use self::index_scan_executor::IndexScanExecutor;
pub use self::insert_executor::InsertExecutor;
pub use self::nested_loop_join_executor::NestedLoopJoinExecutor;
pub use self::projection_executor::ProjectionExecutor;
pub use self::seq_scan_executor::SeqScanExecutor;
pub use self::update_executor::UpdateExecutor;

/// The pull-model operator contract. `open` is idempotent setup, `next`
/// yields tuples until it returns None, `close` releases resources and is
/// safe to call at any time, including before `open`. A single executor
/// tree is driven by one thread; inner children of a join must support
/// close followed by a fresh open.
pub trait Executor {
    fn open(&mut self) -> Result<()>;
    fn next(&mut self) -> Option<Result<Tuple>>;
    fn close(&mut self) -> Result<()>;
    fn schema(&self) -> &Schema;
}
