//! The plan compiler.
//!
//! A single-pass pipeline per goal set: flatten → partition → alias →
//! index variable locations → derive projection → base scan → joins (or
//! cross-join fallback) → plain constraints → predicate-local literal
//! filters → OR-groups → unions. Union branches re-enter the same
//! pipeline recursively. Compilation is pure and synchronous; the caller's
//! goals are cloned where needed, never mutated.

pub mod join_graph;
pub mod locations;

pub use join_graph::{join_pairs, predicates_disconnected, JoinPair};
pub use locations::{LocationIndex, VariableLocation};

use crate::error::{LogiqError, Result};
use crate::goal::{
    Constraint, ConstraintValue, Goal, OrConstraint, Predicate, Union,
};
use crate::plan::{
    ColumnRef, Filter, FilterValue, Join, JoinCondition, OutputColumn, QueryPlan, TableRef,
};
use crate::types::CompareOp;

/// Compiles a goal set into a relational query plan.
///
/// # Errors
///
/// Returns [`LogiqError::EmptyGoalSet`] if the goal set flattens to zero
/// predicates and is not a single union goal,
/// [`LogiqError::SchemaError`] for a list literal bound under a
/// non-membership operator, and [`LogiqError::UnionBranch`] wrapping any
/// failure inside a union branch.
pub fn compile(goals: &[Goal]) -> Result<QueryPlan> {
    // A goal set consisting of exactly one union forwards straight to
    // union compilation; this is the only case where zero predicates is
    // legal.
    if let [Goal::Union(union)] = goals {
        return Ok(QueryPlan::union_of(compile_branches(union)?));
    }

    let parts = partition(goals);

    let predicates = assign_aliases(&parts.predicates);
    if predicates.is_empty() {
        return Err(LogiqError::EmptyGoalSet);
    }

    let index = LocationIndex::build(&predicates);

    let mut plan = QueryPlan::scan(TableRef::new(
        predicates[0].table.clone(),
        predicates[0].alias.clone().unwrap_or_default(),
    ));

    plan.projection = derive_projection(&index);

    // Cross-join fallback and variable-driven joins are mutually
    // exclusive: the fallback fires only when no pair of predicates
    // shares a variable (in which case the join graph is empty anyway).
    if predicates_disconnected(&predicates) {
        plan.joins = cross_joins(&predicates);
    } else {
        plan.joins = variable_joins(&index);
    }

    for constraint in &parts.constraints {
        resolve_constraint(constraint, &index, &mut plan.filters);
    }

    literal_filters(&predicates, &mut plan.filters)?;

    for or in &parts.or_constraints {
        let group = resolve_or_group(or, &index);
        if !group.is_empty() {
            plan.or_groups.push(group);
        }
    }

    for union in &parts.unions {
        plan.unions.extend(compile_branches(union)?);
    }

    Ok(plan)
}

/// The four ordered partitions of a flattened goal set.
struct Partitions<'a> {
    predicates: Vec<&'a Predicate>,
    constraints: Vec<&'a Constraint>,
    or_constraints: Vec<&'a OrConstraint>,
    unions: Vec<&'a Union>,
}

/// Flattens and partitions a goal set.
///
/// Union branch contents are expanded depth-first into the flat
/// predicate/constraint partitions, while the union goals themselves are
/// collected from the top level only; each union is additionally compiled
/// as a standalone plan and combined by set union at the end.
fn partition(goals: &[Goal]) -> Partitions<'_> {
    let mut flat = Vec::new();
    flatten_into(goals, &mut flat);

    let mut parts = Partitions {
        predicates: Vec::new(),
        constraints: Vec::new(),
        or_constraints: Vec::new(),
        unions: Vec::new(),
    };

    for goal in flat {
        match goal {
            Goal::Predicate(p) => parts.predicates.push(p),
            Goal::Constraint(c) => parts.constraints.push(c),
            Goal::OrConstraint(o) => parts.or_constraints.push(o),
            Goal::Union(_) => {}
        }
    }

    for goal in goals {
        if let Goal::Union(u) = goal {
            parts.unions.push(u);
        }
    }

    parts
}

fn flatten_into<'a>(goals: &'a [Goal], out: &mut Vec<&'a Goal>) {
    for goal in goals {
        match goal {
            Goal::Union(union) => {
                for branch in &union.branches {
                    flatten_into(branch, out);
                }
            }
            other => out.push(other),
        }
    }
}

/// Assigns aliases `t1..tN` in flattened order.
///
/// Pure with respect to the input: predicates are cloned with the alias
/// slot filled.
fn assign_aliases(predicates: &[&Predicate]) -> Vec<Predicate> {
    predicates
        .iter()
        .enumerate()
        .map(|(i, pred)| {
            let mut aliased = (*pred).clone();
            aliased.alias = Some(format!("t{}", i + 1));
            aliased
        })
        .collect()
}

/// One output column per distinct variable, sourced from its first
/// occurrence site and named by the variable's display name.
fn derive_projection(index: &LocationIndex) -> Vec<OutputColumn> {
    index
        .iter()
        .filter_map(|locations| locations.first())
        .map(|loc| OutputColumn {
            source: ColumnRef::new(loc.alias.clone(), loc.column.clone()),
            name: loc.display_name.clone(),
        })
        .collect()
}

/// Joins derived from the variable location index.
fn variable_joins(index: &LocationIndex) -> Vec<Join> {
    join_pairs(index)
        .into_iter()
        .map(|pair| Join {
            table: TableRef::new(pair.right.table.clone(), pair.right.alias.clone()),
            on: Some(JoinCondition {
                left: ColumnRef::new(pair.left.alias.clone(), pair.left.column.clone()),
                right: ColumnRef::new(pair.right.alias.clone(), pair.right.column.clone()),
            }),
        })
        .collect()
}

/// Explicit cross product: every predicate after the first joins the base
/// with no ON condition.
fn cross_joins(predicates: &[Predicate]) -> Vec<Join> {
    predicates[1..]
        .iter()
        .map(|pred| Join {
            table: TableRef::new(
                pred.table.clone(),
                pred.alias.clone().unwrap_or_default(),
            ),
            on: None,
        })
        .collect()
}

/// Resolves a plain constraint into one condition per occurrence site of
/// its variable. A variable with zero locations contributes nothing.
fn resolve_constraint(constraint: &Constraint, index: &LocationIndex, out: &mut Vec<Filter>) {
    for loc in index.locations(constraint.variable.id()) {
        out.push(Filter {
            column: ColumnRef::new(loc.alias.clone(), loc.column.clone()),
            op: constraint.operator,
            value: coerce_operand(constraint.operator, &constraint.value),
        });
    }
}

/// Membership operators coerce a scalar operand to a one-element list.
fn coerce_operand(op: CompareOp, value: &ConstraintValue) -> FilterValue {
    match value {
        ConstraintValue::Scalar(s) if op.is_membership() => FilterValue::List(vec![s.clone()]),
        ConstraintValue::Scalar(s) => FilterValue::Scalar(s.clone()),
        ConstraintValue::List(items) => FilterValue::List(items.clone()),
    }
}

/// Table-qualified filters from the non-variable column bindings of each
/// aliased predicate. A list literal is only meaningful under a membership
/// operator, so any other pairing is rejected here rather than at
/// execution time.
fn literal_filters(predicates: &[Predicate], out: &mut Vec<Filter>) -> Result<()> {
    for pred in predicates {
        let Some(alias) = &pred.alias else { continue };
        for binding in &pred.columns {
            let value = match &binding.value {
                crate::goal::BindingValue::Scalar(s) if binding.operator.is_membership() => {
                    FilterValue::List(vec![s.clone()])
                }
                crate::goal::BindingValue::Scalar(s) => FilterValue::Scalar(s.clone()),
                crate::goal::BindingValue::List(items) => {
                    if !binding.operator.is_membership() {
                        return Err(LogiqError::SchemaError(format!(
                            "Column '{}' binds a list but uses operator '{}'; \
                             list literals need IN or NOT IN",
                            binding.column, binding.operator
                        )));
                    }
                    FilterValue::List(items.clone())
                }
                crate::goal::BindingValue::Var(_) => continue,
            };
            out.push(Filter {
                column: ColumnRef::new(alias.clone(), binding.column.clone()),
                op: binding.operator,
                value,
            });
        }
    }
    Ok(())
}

/// Resolves every clause of an OR-constraint and collects all resulting
/// conditions into one group. Clauses over unbound variables contribute
/// nothing.
fn resolve_or_group(or: &OrConstraint, index: &LocationIndex) -> Vec<Filter> {
    let mut group = Vec::new();
    for clause in &or.clauses {
        resolve_constraint(clause, index, &mut group);
    }
    group
}

/// Compiles each branch of a union independently, tagging failures with
/// the branch index.
fn compile_branches(union: &Union) -> Result<Vec<QueryPlan>> {
    union
        .branches
        .iter()
        .enumerate()
        .map(|(i, branch)| compile(branch).map_err(|e| e.in_union_branch(i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{BindingValue, ColumnBinding, Variable};
    use uuid::Uuid;

    fn var(name: &str) -> Variable {
        Variable::with_id(Uuid::new_v4(), name)
    }

    fn pred(table: &str, cols: Vec<(&str, BindingValue)>) -> Goal {
        Goal::Predicate(Predicate::new(
            table,
            cols.into_iter()
                .map(|(c, v)| ColumnBinding::new(c, v))
                .collect(),
        ))
    }

    #[test]
    fn test_aliases_follow_flattened_order() {
        let a = var("a");
        let b = var("b");
        let goals = vec![
            pred("x", vec![("c", BindingValue::from(&a))]),
            pred("y", vec![("c", BindingValue::from(&a)), ("d", BindingValue::from(&b))]),
            pred("z", vec![("c", BindingValue::from(&b))]),
        ];
        let plan = compile(&goals).unwrap();
        assert_eq!(plan.base.as_ref().unwrap().alias, "t1");
        let joined: Vec<&str> = plan.joins.iter().map(|j| j.table.alias.as_str()).collect();
        assert_eq!(joined, vec!["t2", "t3"]);
    }

    #[test]
    fn test_shared_variable_across_three_predicates_joins_every_pair() {
        // Pairwise generation with alias-pair dedup: a variable shared by
        // three predicates yields all three alias pairs, so the last
        // predicate is introduced by two join clauses.
        let a = var("a");
        let goals = vec![
            pred("x", vec![("c", BindingValue::from(&a))]),
            pred("y", vec![("c", BindingValue::from(&a))]),
            pred("z", vec![("c", BindingValue::from(&a))]),
        ];
        let plan = compile(&goals).unwrap();
        let joined: Vec<&str> = plan.joins.iter().map(|j| j.table.alias.as_str()).collect();
        assert_eq!(joined, vec!["t2", "t3", "t3"]);
    }

    #[test]
    fn test_empty_goal_set_fails() {
        let err = compile(&[]).unwrap_err();
        assert!(matches!(err, LogiqError::EmptyGoalSet));
    }

    #[test]
    fn test_constraint_only_goal_set_fails() {
        let c = Constraint::new(
            var("x"),
            CompareOp::Gt,
            ConstraintValue::Scalar(1i64.into()),
        );
        let err = compile(&[Goal::Constraint(c)]).unwrap_err();
        assert!(matches!(err, LogiqError::EmptyGoalSet));
    }

    #[test]
    fn test_union_branch_error_carries_index() {
        let a = var("a");
        let union = Union {
            branches: vec![
                vec![pred("x", vec![("c", BindingValue::from(&a))])],
                vec![],
            ],
        };
        let err = compile(&[Goal::Union(union)]).unwrap_err();
        match err {
            LogiqError::UnionBranch { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, LogiqError::EmptyGoalSet));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_caller_goals_are_not_mutated() {
        let a = var("a");
        let goals = vec![
            pred("x", vec![("c", BindingValue::from(&a))]),
            pred("y", vec![("c", BindingValue::from(&a))]),
        ];
        let before = goals.clone();
        let _ = compile(&goals).unwrap();
        assert_eq!(goals, before);
    }
}
