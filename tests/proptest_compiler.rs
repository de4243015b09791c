//! Property-based tests for the compiler over generated goal sets.

use std::collections::HashSet;

use proptest::prelude::*;

use logiq::builder::{var, Relation};
use logiq::compile;
use logiq::goal::{Goal, Variable};

const TABLES: [&str; 3] = ["people", "parent_kid", "cities"];
const COLUMNS: [&str; 3] = ["c0", "c1", "c2"];
const VAR_POOL: usize = 4;

/// A predicate over a table, binding a distinct subset of the variable
/// pool to consecutive columns.
#[derive(Debug, Clone)]
struct PredicateSpec {
    table: usize,
    vars: Vec<usize>,
}

#[derive(Debug, Clone)]
struct GoalSetSpec {
    predicates: Vec<PredicateSpec>,
    constraints: Vec<(usize, i64)>,
}

fn predicate_spec() -> impl Strategy<Value = PredicateSpec> {
    (
        0..TABLES.len(),
        proptest::sample::subsequence((0..VAR_POOL).collect::<Vec<_>>(), 1..=COLUMNS.len()),
    )
        .prop_map(|(table, vars)| PredicateSpec { table, vars })
}

fn goal_set_spec() -> impl Strategy<Value = GoalSetSpec> {
    (
        proptest::collection::vec(predicate_spec(), 1..4),
        proptest::collection::vec((0..VAR_POOL, -10i64..10), 0..3),
    )
        .prop_map(|(predicates, constraints)| GoalSetSpec {
            predicates,
            constraints,
        })
}

fn build_goals(spec: &GoalSetSpec) -> (Vec<Goal>, Vec<Variable>) {
    let pool: Vec<Variable> = (0..VAR_POOL).map(|i| var(format!("v{i}"))).collect();
    let mut goals = Vec::new();
    for pred in &spec.predicates {
        let relation = Relation::new(TABLES[pred.table]);
        goals.push(relation.bind(
            pred.vars
                .iter()
                .enumerate()
                .map(|(i, &v)| (COLUMNS[i], (&pool[v]).into())),
        ));
    }
    for &(v, bound) in &spec.constraints {
        goals.push(logiq::builder::gt(&pool[v], bound));
    }
    (goals, pool)
}

/// Variable pool indices in order of first appearance across predicates.
fn first_appearance_order(spec: &GoalSetSpec) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for pred in &spec.predicates {
        for &v in &pred.vars {
            if seen.insert(v) {
                order.push(v);
            }
        }
    }
    order
}

fn fully_disconnected(spec: &GoalSetSpec) -> bool {
    let sets: Vec<HashSet<usize>> = spec
        .predicates
        .iter()
        .map(|p| p.vars.iter().copied().collect())
        .collect();
    sets.len() > 1
        && sets
            .iter()
            .enumerate()
            .all(|(i, a)| sets[i + 1..].iter().all(|b| a.is_disjoint(b)))
}

proptest! {
    #[test]
    fn prop_compilation_is_deterministic(spec in goal_set_spec()) {
        let (goals, _pool) = build_goals(&spec);
        prop_assert_eq!(compile(&goals).unwrap(), compile(&goals).unwrap());
    }

    #[test]
    fn prop_aliases_are_well_formed(spec in goal_set_spec()) {
        let (goals, _pool) = build_goals(&spec);
        let plan = compile(&goals).unwrap();

        // Join clauses may repeat an alias (a pair can be reached through
        // two different shared variables), but every alias in the plan
        // must be one of the t1..tN assigned to the predicates.
        let n = spec.predicates.len();
        for table_ref in plan.aliases() {
            let alias = &table_ref.alias;
            prop_assert!(alias.starts_with('t'));
            let idx: usize = alias[1..].parse().unwrap();
            prop_assert!(idx >= 1 && idx <= n);
            // Alias and table name stay paired the way they were assigned.
            prop_assert_eq!(table_ref.table.as_str(), TABLES[spec.predicates[idx - 1].table]);
        }
        prop_assert_eq!(plan.base.as_ref().unwrap().alias.as_str(), "t1");
    }

    #[test]
    fn prop_projection_covers_each_variable_once(spec in goal_set_spec()) {
        let (goals, _pool) = build_goals(&spec);
        let plan = compile(&goals).unwrap();

        let expected: Vec<String> = first_appearance_order(&spec)
            .into_iter()
            .map(|v| format!("v{v}"))
            .collect();
        prop_assert_eq!(plan.output_names(), expected);
    }

    #[test]
    fn prop_joins_follow_shared_variables(spec in goal_set_spec()) {
        let (goals, _pool) = build_goals(&spec);
        let plan = compile(&goals).unwrap();

        if fully_disconnected(&spec) {
            // Every predicate past the base is cross-joined.
            prop_assert_eq!(plan.joins.len(), spec.predicates.len() - 1);
            for join in &plan.joins {
                prop_assert!(join.on.is_none());
            }
            return Ok(());
        }

        for join in &plan.joins {
            prop_assert!(join.on.is_some());
        }

        // Each pair of predicates sharing a variable is joined exactly once.
        let joined: HashSet<(String, String)> = plan
            .joins
            .iter()
            .filter_map(|j| j.on.as_ref())
            .map(|on| {
                let (a, b) = (on.left.alias.clone(), on.right.alias.clone());
                if a <= b { (a, b) } else { (b, a) }
            })
            .collect();
        prop_assert_eq!(joined.len(), plan.joins.len());

        for (i, a) in spec.predicates.iter().enumerate() {
            for (j, b) in spec.predicates.iter().enumerate().skip(i + 1) {
                if a.vars.iter().any(|v| b.vars.contains(v)) {
                    let pair = (format!("t{}", i + 1), format!("t{}", j + 1));
                    prop_assert!(
                        joined.contains(&pair),
                        "predicates {} and {} share a variable but are not joined",
                        i,
                        j
                    );
                }
            }
        }
    }

    #[test]
    fn prop_constraints_never_invent_columns(spec in goal_set_spec()) {
        let (goals, _pool) = build_goals(&spec);
        let plan = compile(&goals).unwrap();

        // Every filter refers to a column some predicate actually binds.
        let bound: HashSet<(String, String)> = spec
            .predicates
            .iter()
            .enumerate()
            .flat_map(|(i, p)| {
                p.vars
                    .iter()
                    .enumerate()
                    .map(move |(c, _)| (format!("t{}", i + 1), COLUMNS[c].to_string()))
            })
            .collect();
        for filter in &plan.filters {
            let key = (filter.column.alias.clone(), filter.column.column.clone());
            prop_assert!(bound.contains(&key));
        }
    }
}
