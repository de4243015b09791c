//! Compiled query plan definitions.
//!
//! A [`QueryPlan`] is the compiler's output and the unit handed to an
//! execution backend: one aliased base relation plus joins, filters,
//! projection, OR-groups, and optional set-union composition. Plans are
//! plain values with no aliasing back to the caller's goals.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{CompareOp, ScalarValue};

/// An aliased table reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    /// Table name in the target store.
    pub table: String,
    /// Compiler-assigned alias (`t1`, `t2`, …).
    pub alias: String,
}

impl TableRef {
    /// Creates an aliased table reference.
    #[must_use]
    pub fn new(table: impl Into<String>, alias: impl Into<String>) -> Self {
        TableRef {
            table: table.into(),
            alias: alias.into(),
        }
    }
}

/// A table-qualified column reference (`alias.column`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Table alias within the plan.
    pub alias: String,
    /// Column name.
    pub column: String,
}

impl ColumnRef {
    /// Creates a column reference.
    #[must_use]
    pub fn new(alias: impl Into<String>, column: impl Into<String>) -> Self {
        ColumnRef {
            alias: alias.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.alias, self.column)
    }
}

/// Equality condition between two column references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCondition {
    /// Site introduced earlier in variable first-seen order.
    pub left: ColumnRef,
    /// Site on the joined table.
    pub right: ColumnRef,
}

/// One join step: a table brought into the plan, with an optional ON
/// condition. `on: None` denotes a cross join (disconnection fallback).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    /// The joined table and its alias.
    pub table: TableRef,
    /// Equality condition, or `None` for a cross join.
    pub on: Option<JoinCondition>,
}

/// One projected output column: sourced from a variable's first
/// occurrence site, named by the variable's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumn {
    /// Source site (`alias.column`).
    pub source: ColumnRef,
    /// Output name (the variable's display label).
    pub name: String,
}

/// Operand of a plan filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    /// Single scalar operand.
    Scalar(ScalarValue),
    /// List operand (membership operators).
    List(Vec<ScalarValue>),
}

/// A table-qualified condition: `alias.column OP value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// The filtered column site.
    pub column: ColumnRef,
    /// Comparison operator.
    pub op: CompareOp,
    /// Operand; membership operators always carry a list here.
    pub value: FilterValue,
}

/// A compiled relational query plan.
///
/// `base` is `None` only for the union-only form (a goal set consisting of
/// exactly one union goal), in which case the plan is the set union of its
/// `unions` sub-plans and every other field is empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Base relation scanned first, or `None` for union-only plans.
    pub base: Option<TableRef>,
    /// Projected output columns, in variable first-appearance order.
    /// Empty means "select everything".
    pub projection: Vec<OutputColumn>,
    /// Join steps in emission order.
    pub joins: Vec<Join>,
    /// ANDed filters: resolved constraints plus predicate-local literals.
    pub filters: Vec<Filter>,
    /// OR-groups; each inner list is OR'ed together, groups are ANDed.
    pub or_groups: Vec<Vec<Filter>>,
    /// Independently compiled sub-plans combined by set union.
    pub unions: Vec<QueryPlan>,
}

impl QueryPlan {
    /// Creates a plan scanning the given base relation.
    #[must_use]
    pub fn scan(base: TableRef) -> Self {
        QueryPlan {
            base: Some(base),
            ..QueryPlan::default()
        }
    }

    /// Creates a union-only plan from branch sub-plans.
    #[must_use]
    pub fn union_of(branches: Vec<QueryPlan>) -> Self {
        QueryPlan {
            unions: branches,
            ..QueryPlan::default()
        }
    }

    /// Returns every alias in scope: the base plus each joined table.
    #[must_use]
    pub fn aliases(&self) -> Vec<&TableRef> {
        self.base
            .iter()
            .chain(self.joins.iter().map(|j| &j.table))
            .collect()
    }

    /// Returns true if this is the union-only form.
    #[must_use]
    pub fn is_union_only(&self) -> bool {
        self.base.is_none()
    }

    /// Returns the output column names in projection order.
    #[must_use]
    pub fn output_names(&self) -> Vec<String> {
        if self.is_union_only() {
            return self
                .unions
                .first()
                .map(QueryPlan::output_names)
                .unwrap_or_default();
        }
        self.projection.iter().map(|c| c.name.clone()).collect()
    }
}

// =============================================================================
// Display implementation: indented plan tree for diagnostics
// =============================================================================

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format_plan(f, 0)
    }
}

impl QueryPlan {
    /// Formats the plan as a tree with indentation.
    fn format_plan(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        let child_prefix = "  ".repeat(indent + 1);

        if let Some(base) = &self.base {
            writeln!(f, "{prefix}Scan: {} as {}", base.table, base.alias)?;
            for join in &self.joins {
                match &join.on {
                    Some(cond) => writeln!(
                        f,
                        "{child_prefix}Join: {} as {} ON {} = {}",
                        join.table.table, join.table.alias, cond.left, cond.right
                    )?,
                    None => writeln!(
                        f,
                        "{child_prefix}CrossJoin: {} as {}",
                        join.table.table, join.table.alias
                    )?,
                }
            }
            for filter in &self.filters {
                writeln!(
                    f,
                    "{child_prefix}Filter: {} {} {}",
                    filter.column,
                    filter.op,
                    format_filter_value(&filter.value)
                )?;
            }
            for group in &self.or_groups {
                let clauses: Vec<String> = group
                    .iter()
                    .map(|c| format!("{} {} {}", c.column, c.op, format_filter_value(&c.value)))
                    .collect();
                writeln!(f, "{child_prefix}OrGroup: [{}]", clauses.join(" OR "))?;
            }
            if !self.projection.is_empty() {
                let cols: Vec<String> = self
                    .projection
                    .iter()
                    .map(|c| format!("{} as {}", c.source, c.name))
                    .collect();
                writeln!(f, "{child_prefix}Project: [{}]", cols.join(", "))?;
            }
        }
        if !self.unions.is_empty() {
            writeln!(f, "{prefix}Union: {} branches", self.unions.len())?;
            for (i, branch) in self.unions.iter().enumerate() {
                writeln!(f, "{child_prefix}Branch {i}:")?;
                branch.format_plan(f, indent + 2)?;
            }
        }
        Ok(())
    }
}

fn format_filter_value(value: &FilterValue) -> String {
    match value {
        FilterValue::Scalar(s) => format!("{s:?}"),
        FilterValue::List(items) => format!("{items:?}"),
    }
}
