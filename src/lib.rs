//! logiq - an embeddable logic-query compiler.
//!
//! Callers state *goals* (table predicates binding named logical
//! variables, scalar constraints, OR-groups, and disjunctions) instead of
//! hand-writing joins. The compiler infers which tables must be joined and
//! on which columns purely from shared variable occurrences, assigns
//! stable aliases, derives the output projection, rewrites constraints
//! into table-qualified predicates, and compiles nested disjunctions
//! recursively. The resulting [`plan::QueryPlan`] is handed to a
//! pluggable [`backend::ExecutionBackend`].
//!
//! ```
//! use logiq::builder::{var, Relation};
//! use logiq::compiler::compile;
//!
//! let parent_kid = Relation::new("parent_kid");
//! let parent = var("parent");
//! let kid = var("kid");
//!
//! let goals = vec![
//!     parent_kid.bind([("parent", (&parent).into()), ("kid", (&kid).into())]),
//! ];
//! let plan = compile(&goals).unwrap();
//! assert_eq!(plan.output_names(), vec!["parent", "kid"]);
//! ```

pub mod backend;
pub mod builder;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod goal;
pub mod plan;
pub mod render;
pub mod types;

pub use backend::{ExecutionBackend, MemoryBackend, MemoryTable};
pub use compiler::compile;
pub use engine::{Engine, EngineConfig};
pub use error::{LogiqError, Result};
pub use goal::{Goal, GoalSet, Variable};
pub use plan::QueryPlan;
pub use render::to_sql;
pub use types::{CompareOp, QueryResult, Row, ScalarValue};
