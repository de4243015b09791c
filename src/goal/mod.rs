//! The goal model: the algebraic data types of the declarative query
//! language.
//!
//! A query is an ordered [`GoalSet`]; conjunction is implicit. Goals are
//! pure data: construction happens in [`crate::builder`], interpretation
//! in [`crate::compiler`]. The compiler never mutates a caller's goals.

mod variable;

pub use variable::Variable;

use serde::{Deserialize, Serialize};

use crate::types::{CompareOp, ScalarValue};

/// An ordered sequence of goals, ANDed together.
pub type GoalSet = Vec<Goal>;

/// One unit of the declarative query language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Goal {
    /// A table reference with column bindings.
    Predicate(Predicate),
    /// A free-standing scalar filter on a variable.
    Constraint(Constraint),
    /// A disjunction of scalar filters, resolved as one OR-group.
    OrConstraint(OrConstraint),
    /// A disjunction of independently compiled goal sets.
    Union(Union),
}

/// The value slot of a column binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindingValue {
    /// A literal filter on the column.
    Scalar(ScalarValue),
    /// A list literal, for membership operators.
    List(Vec<ScalarValue>),
    /// A join/equality site: the column binds a logical variable.
    Var(Variable),
}

impl BindingValue {
    /// Returns the bound variable, if this binding is a variable site.
    #[must_use]
    pub fn as_var(&self) -> Option<&Variable> {
        match self {
            BindingValue::Var(v) => Some(v),
            _ => None,
        }
    }

    /// Returns true if this binding is a variable site.
    #[must_use]
    pub fn is_var(&self) -> bool {
        matches!(self, BindingValue::Var(_))
    }
}

impl From<&Variable> for BindingValue {
    fn from(v: &Variable) -> Self {
        BindingValue::Var(v.clone())
    }
}

impl From<Variable> for BindingValue {
    fn from(v: Variable) -> Self {
        BindingValue::Var(v)
    }
}

impl From<ScalarValue> for BindingValue {
    fn from(v: ScalarValue) -> Self {
        BindingValue::Scalar(v)
    }
}

impl From<i64> for BindingValue {
    fn from(v: i64) -> Self {
        BindingValue::Scalar(ScalarValue::Int64(v))
    }
}

impl From<f64> for BindingValue {
    fn from(v: f64) -> Self {
        BindingValue::Scalar(ScalarValue::Float64(v))
    }
}

impl From<bool> for BindingValue {
    fn from(v: bool) -> Self {
        BindingValue::Scalar(ScalarValue::Bool(v))
    }
}

impl From<&str> for BindingValue {
    fn from(v: &str) -> Self {
        BindingValue::Scalar(ScalarValue::String(v.to_string()))
    }
}

impl From<String> for BindingValue {
    fn from(v: String) -> Self {
        BindingValue::Scalar(ScalarValue::String(v))
    }
}

impl From<Vec<ScalarValue>> for BindingValue {
    fn from(v: Vec<ScalarValue>) -> Self {
        BindingValue::List(v)
    }
}

/// A single column binding attached to a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBinding {
    /// Column name within the predicate's table.
    pub column: String,
    /// Operator applied when the value is a literal filter.
    pub operator: CompareOp,
    /// Literal filter value or variable join site.
    pub value: BindingValue,
}

impl ColumnBinding {
    /// Creates an equality binding, the common case.
    #[must_use]
    pub fn new(column: impl Into<String>, value: BindingValue) -> Self {
        ColumnBinding {
            column: column.into(),
            operator: CompareOp::Eq,
            value,
        }
    }
}

/// A table goal: a relation with column bindings, some of which may bind
/// logical variables.
///
/// The alias is assigned by the compiler during alias assignment
/// (`t1..tN` in positional order) and is `None` on caller-built goals;
/// once assigned it is immutable for the compilation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// Table name.
    pub table: String,
    /// Compiler-assigned alias, unique across the compiled goal set.
    pub alias: Option<String>,
    /// Ordered column bindings.
    pub columns: Vec<ColumnBinding>,
}

impl Predicate {
    /// Creates an unaliased predicate.
    #[must_use]
    pub fn new(table: impl Into<String>, columns: Vec<ColumnBinding>) -> Self {
        Predicate {
            table: table.into(),
            alias: None,
            columns,
        }
    }

    /// Returns the variables bound by this predicate's columns, in column
    /// order.
    pub fn bound_variables(&self) -> impl Iterator<Item = &Variable> {
        self.columns.iter().filter_map(|c| c.value.as_var())
    }
}

/// A free-standing filter on a variable, not tied to a table until the
/// compiler resolves the variable's occurrence sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// The constrained variable.
    pub variable: Variable,
    /// Comparison operator.
    pub operator: CompareOp,
    /// Scalar or list operand.
    pub value: ConstraintValue,
}

/// Operand of a constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintValue {
    /// A single scalar operand.
    Scalar(ScalarValue),
    /// A list operand, for membership operators.
    List(Vec<ScalarValue>),
}

impl Constraint {
    /// Creates a constraint.
    #[must_use]
    pub fn new(variable: Variable, operator: CompareOp, value: ConstraintValue) -> Self {
        Constraint {
            variable,
            operator,
            value,
        }
    }
}

/// A disjunction of constraints.
///
/// Every clause resolves independently to zero or more table-qualified
/// conditions (one per occurrence site of its variable); all resulting
/// conditions across all clauses are OR'ed as a single group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrConstraint {
    /// Ordered clauses, logically OR'ed.
    pub clauses: Vec<Constraint>,
}

/// A disjunction of goal sets, each compiled as an independent plan and
/// combined by set union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Union {
    /// Ordered branches. Aliasing inside a branch is independent of the
    /// enclosing plan.
    pub branches: Vec<GoalSet>,
}
