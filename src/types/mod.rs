//! Core value types shared by the goal model, the plan, and backends.

pub mod operator;
pub mod value;

pub use operator::CompareOp;
pub use value::{QueryResult, Row, ScalarValue};
