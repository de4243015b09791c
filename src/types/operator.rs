//! Comparison operators usable in constraints and column bindings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison operator for constraints, column bindings, and plan filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// Equality (`=`).
    Eq,
    /// Inequality (`!=`).
    NotEq,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    GtEq,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    LtEq,
    /// Set membership (`IN`).
    In,
    /// Negated set membership (`NOT IN`).
    NotIn,
}

impl CompareOp {
    /// Returns the SQL spelling of the operator.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::In => "IN",
            CompareOp::NotIn => "NOT IN",
        }
    }

    /// Returns true for the set-membership operators.
    ///
    /// These coerce a scalar operand to a one-element list at resolution
    /// time.
    #[must_use]
    pub fn is_membership(&self) -> bool {
        matches!(self, CompareOp::In | CompareOp::NotIn)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
