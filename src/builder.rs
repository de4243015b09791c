//! Goal-construction API.
//!
//! The caller's side of the contract: mint variables, bind them in table
//! predicates, attach constraints, and group alternatives. Everything
//! here produces plain [`Goal`] values; nothing touches the compiler.
//!
//! ```
//! use logiq::builder::{conj, eq, var, Relation};
//!
//! let people = Relation::new("people");
//! let person = var("person");
//! let color = var("color");
//!
//! let goals = conj([
//!     vec![people.bind([("name", (&person).into()), ("favorite_color", (&color).into())])],
//!     vec![eq(&color, "green")],
//! ]);
//! assert_eq!(goals.len(), 2);
//! ```

use uuid::Uuid;

use crate::goal::{
    BindingValue, ColumnBinding, Constraint, ConstraintValue, Goal, GoalSet, OrConstraint,
    Predicate, Union, Variable,
};
use crate::types::{CompareOp, ScalarValue};

/// Mints a fresh logical variable with the given display name.
///
/// Ids are UUIDv4, globally unique per call; two calls with the same name
/// produce distinct variables.
#[must_use]
pub fn var(name: impl Into<String>) -> Variable {
    Variable::with_id(Uuid::new_v4(), name)
}

/// A named relation usable to build table goals.
#[derive(Debug, Clone)]
pub struct Relation {
    name: String,
}

impl Relation {
    /// Creates a relation handle for the given table name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Relation { name: name.into() }
    }

    /// Builds a predicate goal binding the given columns.
    ///
    /// Each binding is an equality: a variable value marks a join site, a
    /// scalar value a literal filter.
    #[must_use]
    pub fn bind<'a, I>(&self, bindings: I) -> Goal
    where
        I: IntoIterator<Item = (&'a str, BindingValue)>,
    {
        Goal::Predicate(Predicate::new(
            self.name.clone(),
            bindings
                .into_iter()
                .map(|(column, value)| ColumnBinding::new(column, value))
                .collect(),
        ))
    }
}

fn constraint(variable: &Variable, operator: CompareOp, value: ConstraintValue) -> Constraint {
    Constraint::new(variable.clone(), operator, value)
}

fn scalar_constraint(
    variable: &Variable,
    operator: CompareOp,
    value: impl Into<ScalarValue>,
) -> Goal {
    Goal::Constraint(constraint(
        variable,
        operator,
        ConstraintValue::Scalar(value.into()),
    ))
}

/// `variable = value`.
#[must_use]
pub fn eq(variable: &Variable, value: impl Into<ScalarValue>) -> Goal {
    scalar_constraint(variable, CompareOp::Eq, value)
}

/// `variable != value`.
#[must_use]
pub fn neq(variable: &Variable, value: impl Into<ScalarValue>) -> Goal {
    scalar_constraint(variable, CompareOp::NotEq, value)
}

/// `variable > value`.
#[must_use]
pub fn gt(variable: &Variable, value: impl Into<ScalarValue>) -> Goal {
    scalar_constraint(variable, CompareOp::Gt, value)
}

/// `variable >= value`.
#[must_use]
pub fn gte(variable: &Variable, value: impl Into<ScalarValue>) -> Goal {
    scalar_constraint(variable, CompareOp::GtEq, value)
}

/// `variable < value`.
#[must_use]
pub fn lt(variable: &Variable, value: impl Into<ScalarValue>) -> Goal {
    scalar_constraint(variable, CompareOp::Lt, value)
}

/// `variable <= value`.
#[must_use]
pub fn lte(variable: &Variable, value: impl Into<ScalarValue>) -> Goal {
    scalar_constraint(variable, CompareOp::LtEq, value)
}

/// `variable IN (values…)`.
#[must_use]
pub fn in_list<I, V>(variable: &Variable, values: I) -> Goal
where
    I: IntoIterator<Item = V>,
    V: Into<ScalarValue>,
{
    Goal::Constraint(constraint(
        variable,
        CompareOp::In,
        ConstraintValue::List(values.into_iter().map(Into::into).collect()),
    ))
}

/// `variable NOT IN (values…)`.
#[must_use]
pub fn not_in_list<I, V>(variable: &Variable, values: I) -> Goal
where
    I: IntoIterator<Item = V>,
    V: Into<ScalarValue>,
{
    Goal::Constraint(constraint(
        variable,
        CompareOp::NotIn,
        ConstraintValue::List(values.into_iter().map(Into::into).collect()),
    ))
}

/// OR-group of constraint clauses: each clause resolves independently and
/// the resulting conditions are OR'ed as one unit.
///
/// Clauses must be constraint goals; predicate and union goals cannot be
/// OR'ed this way (use [`disj`] for those).
#[must_use]
pub fn any_of<I>(clauses: I) -> Goal
where
    I: IntoIterator<Item = Goal>,
{
    Goal::OrConstraint(OrConstraint {
        clauses: clauses
            .into_iter()
            .filter_map(|goal| match goal {
                Goal::Constraint(c) => Some(c),
                _ => None,
            })
            .collect(),
    })
}

/// Flattening conjunction: nested goal vectors are spliced into one flat
/// goal set. Nesting conveys no grouping beyond this.
#[must_use]
pub fn conj<I>(goal_groups: I) -> GoalSet
where
    I: IntoIterator<Item = Vec<Goal>>,
{
    goal_groups.into_iter().flatten().collect()
}

/// Disjunction of single goals: each goal becomes its own union branch.
#[must_use]
pub fn disj<I>(goals: I) -> Goal
where
    I: IntoIterator<Item = Goal>,
{
    Goal::Union(Union {
        branches: goals.into_iter().map(|g| vec![g]).collect(),
    })
}

/// Disjunction of goal sets: each set is one union branch, compiled
/// independently.
#[must_use]
pub fn disj_all<I>(branches: I) -> Goal
where
    I: IntoIterator<Item = GoalSet>,
{
    Goal::Union(Union {
        branches: branches.into_iter().collect(),
    })
}
