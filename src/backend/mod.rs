//! Execution backends.
//!
//! The compiler hands a finished [`QueryPlan`] across this boundary and
//! awaits a result set; everything behind it (rendering, drivers,
//! connectivity) is the backend's concern. Backend failures surface as
//! [`crate::LogiqError::ExecutionError`] or
//! [`crate::LogiqError::SchemaError`]; the compiler never inspects
//! backend internals beyond that classification.

pub mod memory;

pub use memory::{MemoryBackend, MemoryTable};

use async_trait::async_trait;

use crate::error::Result;
use crate::plan::QueryPlan;
use crate::types::Row;

/// A query execution backend.
///
/// Given a compiled plan and a target store of relations, returns an
/// ordered sequence of result rows keyed by projected output name.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Executes a compiled plan.
    ///
    /// # Errors
    ///
    /// Returns an execution or schema error if the plan cannot be run
    /// against the backend's store.
    async fn execute(&self, plan: &QueryPlan) -> Result<Vec<Row>>;
}
