//! Plan-to-SQL rendering.
//!
//! Produces the "rendered query text" form of the execution-backend
//! contract. Rendering is deterministic: the same plan always yields the
//! same string.

use std::fmt::Write;

use crate::plan::{Filter, FilterValue, QueryPlan};
use crate::types::ScalarValue;

/// Renders a compiled plan as a SQL SELECT statement.
#[must_use]
pub fn to_sql(plan: &QueryPlan) -> String {
    if plan.is_union_only() {
        return plan
            .unions
            .iter()
            .map(to_sql)
            .collect::<Vec<_>>()
            .join(" UNION ");
    }

    let mut sql = String::new();

    if plan.projection.is_empty() {
        sql.push_str("SELECT *");
    } else {
        sql.push_str("SELECT ");
        let columns: Vec<String> = plan
            .projection
            .iter()
            .map(|c| format!("{} AS {}", c.source, c.name))
            .collect();
        sql.push_str(&columns.join(", "));
    }

    if let Some(base) = &plan.base {
        let _ = write!(sql, " FROM {} AS {}", base.table, base.alias);
    }

    for join in &plan.joins {
        match &join.on {
            Some(cond) => {
                let _ = write!(
                    sql,
                    " JOIN {} AS {} ON {} = {}",
                    join.table.table, join.table.alias, cond.left, cond.right
                );
            }
            None => {
                let _ = write!(sql, " CROSS JOIN {} AS {}", join.table.table, join.table.alias);
            }
        }
    }

    let mut conditions: Vec<String> = plan.filters.iter().map(render_filter).collect();
    for group in &plan.or_groups {
        if group.is_empty() {
            continue;
        }
        let clauses: Vec<String> = group.iter().map(render_filter).collect();
        conditions.push(format!("({})", clauses.join(" OR ")));
    }
    if !conditions.is_empty() {
        let _ = write!(sql, " WHERE {}", conditions.join(" AND "));
    }

    for branch in &plan.unions {
        let _ = write!(sql, " UNION {}", to_sql(branch));
    }

    sql
}

fn render_filter(filter: &Filter) -> String {
    format!(
        "{} {} {}",
        filter.column,
        filter.op,
        render_value(&filter.value)
    )
}

fn render_value(value: &FilterValue) -> String {
    match value {
        FilterValue::Scalar(s) => render_scalar(s),
        FilterValue::List(items) => {
            let rendered: Vec<String> = items.iter().map(render_scalar).collect();
            format!("({})", rendered.join(", "))
        }
    }
}

fn render_scalar(value: &ScalarValue) -> String {
    match value {
        ScalarValue::Int64(i) => i.to_string(),
        ScalarValue::Float64(f) => f.to_string(),
        ScalarValue::Bool(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        // Single quotes are doubled, the portable SQL escape.
        ScalarValue::String(s) => format!("'{}'", s.replace('\'', "''")),
        ScalarValue::Null => "NULL".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{ColumnRef, Join, JoinCondition, OutputColumn, TableRef};
    use crate::types::CompareOp;

    fn base_plan() -> QueryPlan {
        let mut plan = QueryPlan::scan(TableRef::new("people", "t1"));
        plan.projection.push(OutputColumn {
            source: ColumnRef::new("t1", "name"),
            name: "person".into(),
        });
        plan
    }

    #[test]
    fn test_single_table_select() {
        let sql = to_sql(&base_plan());
        assert_eq!(sql, "SELECT t1.name AS person FROM people AS t1");
    }

    #[test]
    fn test_join_rendering() {
        let mut plan = base_plan();
        plan.joins.push(Join {
            table: TableRef::new("parent_kid", "t2"),
            on: Some(JoinCondition {
                left: ColumnRef::new("t1", "name"),
                right: ColumnRef::new("t2", "parent"),
            }),
        });
        let sql = to_sql(&plan);
        assert!(sql.contains("JOIN parent_kid AS t2 ON t1.name = t2.parent"));
    }

    #[test]
    fn test_cross_join_rendering() {
        let mut plan = base_plan();
        plan.joins.push(Join {
            table: TableRef::new("colors", "t2"),
            on: None,
        });
        assert!(to_sql(&plan).contains("CROSS JOIN colors AS t2"));
    }

    #[test]
    fn test_string_literals_are_quoted_and_escaped() {
        let mut plan = base_plan();
        plan.filters.push(Filter {
            column: ColumnRef::new("t1", "name"),
            op: CompareOp::Eq,
            value: FilterValue::Scalar("O'Brien".into()),
        });
        assert!(to_sql(&plan).contains("WHERE t1.name = 'O''Brien'"));
    }

    #[test]
    fn test_in_list_rendering() {
        let mut plan = base_plan();
        plan.filters.push(Filter {
            column: ColumnRef::new("t1", "favorite_color"),
            op: CompareOp::In,
            value: FilterValue::List(vec!["green".into(), "orange".into()]),
        });
        assert!(to_sql(&plan).contains("t1.favorite_color IN ('green', 'orange')"));
    }

    #[test]
    fn test_or_group_is_parenthesized() {
        let mut plan = base_plan();
        plan.or_groups.push(vec![
            Filter {
                column: ColumnRef::new("t1", "c"),
                op: CompareOp::Eq,
                value: FilterValue::Scalar("green".into()),
            },
            Filter {
                column: ColumnRef::new("t1", "c"),
                op: CompareOp::Eq,
                value: FilterValue::Scalar("red".into()),
            },
        ]);
        assert!(to_sql(&plan).contains("WHERE (t1.c = 'green' OR t1.c = 'red')"));
    }

    #[test]
    fn test_union_only_plan() {
        let plan = QueryPlan::union_of(vec![base_plan(), base_plan()]);
        let sql = to_sql(&plan);
        assert_eq!(
            sql,
            "SELECT t1.name AS person FROM people AS t1 UNION SELECT t1.name AS person FROM people AS t1"
        );
    }
}
