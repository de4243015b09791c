//! In-memory reference backend.
//!
//! Executes compiled plans against tables registered in memory: scan,
//! nested-loop join (cross join when the plan carries no ON condition),
//! filter, OR-group, projection, and set union with duplicate removal.
//! Useful for tests and as the executable specification of how a backend
//! should interpret a plan.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::{LogiqError, Result};
use crate::plan::{ColumnRef, Filter, FilterValue, QueryPlan};
use crate::types::{CompareOp, Row, ScalarValue};

use super::ExecutionBackend;

/// A named in-memory relation: ordered columns and rows of scalars.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Vec<ScalarValue>>,
}

impl MemoryTable {
    /// Creates an empty table with the given column names.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        MemoryTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the row arity does not match the column
    /// count.
    pub fn insert(&mut self, row: Vec<ScalarValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(LogiqError::SchemaError(format!(
                "Row has {} values, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Returns the position of a column, if present.
    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// In-memory execution backend holding named tables.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: HashMap<String, MemoryTable>,
}

/// One candidate result: a row index per alias in scope.
type AliasBinding = HashMap<String, usize>;

impl MemoryBackend {
    /// Creates a backend with no tables.
    #[must_use]
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    /// Registers (or replaces) a table under the given name.
    pub fn register_table(&mut self, name: impl Into<String>, table: MemoryTable) {
        self.tables.insert(name.into(), table);
    }

    /// Convenience: registers a table from column names and literal rows.
    ///
    /// # Errors
    ///
    /// Returns a schema error on row arity mismatch.
    pub fn load_table(
        &mut self,
        name: impl Into<String>,
        columns: &[&str],
        rows: Vec<Vec<ScalarValue>>,
    ) -> Result<()> {
        let mut table = MemoryTable::new(columns.iter().map(ToString::to_string).collect());
        for row in rows {
            table.insert(row)?;
        }
        self.register_table(name, table);
        Ok(())
    }

    fn table(&self, name: &str) -> Result<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| LogiqError::SchemaError(format!("Table '{name}' does not exist")))
    }

    /// Executes the relational block of a plan (everything except its
    /// union composition), returning one projected row per surviving
    /// alias binding.
    fn execute_block(&self, plan: &QueryPlan) -> Result<Vec<Row>> {
        // alias -> table, resolved before any row loop runs
        let mut scope: Vec<(String, &MemoryTable)> = Vec::new();
        for table_ref in plan.aliases() {
            scope.push((table_ref.alias.clone(), self.table(&table_ref.table)?));
        }
        let schemas: HashMap<&str, &MemoryTable> =
            scope.iter().map(|(a, t)| (a.as_str(), *t)).collect();

        let base = plan
            .base
            .as_ref()
            .ok_or_else(|| LogiqError::ExecutionError("Plan has no base relation".into()))?;
        let base_table = self.table(&base.table)?;

        let mut bindings: Vec<AliasBinding> = (0..base_table.len())
            .map(|i| {
                let mut b = AliasBinding::new();
                b.insert(base.alias.clone(), i);
                b
            })
            .collect();

        let mut bound_aliases: HashSet<&str> = HashSet::new();
        bound_aliases.insert(base.alias.as_str());

        for join in &plan.joins {
            // A second join clause for an alias already bound would
            // silently overwrite its row binding and drop the first
            // clause's condition. A SQL engine rejects the duplicate
            // alias in FROM; so do we.
            if !bound_aliases.insert(join.table.alias.as_str()) {
                return Err(LogiqError::ExecutionError(format!(
                    "Join introduces alias '{}' more than once",
                    join.table.alias
                )));
            }
            let joined = self.table(&join.table.table)?;
            let mut extended = Vec::new();
            for binding in &bindings {
                for row_idx in 0..joined.len() {
                    let mut candidate = binding.clone();
                    candidate.insert(join.table.alias.clone(), row_idx);
                    let keep = match &join.on {
                        None => true,
                        Some(cond) => {
                            let left = resolve(&schemas, &candidate, &cond.left)?;
                            let right = resolve(&schemas, &candidate, &cond.right)?;
                            // SQL equality: null never matches
                            !left.is_null() && left == right
                        }
                    };
                    if keep {
                        extended.push(candidate);
                    }
                }
            }
            bindings = extended;
        }

        let mut rows = Vec::new();
        'next_binding: for binding in &bindings {
            for filter in &plan.filters {
                if !eval_filter(&schemas, binding, filter)? {
                    continue 'next_binding;
                }
            }
            for group in &plan.or_groups {
                let mut any = group.is_empty();
                for clause in group {
                    if eval_filter(&schemas, binding, clause)? {
                        any = true;
                        break;
                    }
                }
                if !any {
                    continue 'next_binding;
                }
            }
            rows.push(project(&schemas, binding, plan)?);
        }

        Ok(rows)
    }
}

#[async_trait]
impl ExecutionBackend for MemoryBackend {
    async fn execute(&self, plan: &QueryPlan) -> Result<Vec<Row>> {
        let mut rows = if plan.is_union_only() {
            Vec::new()
        } else {
            self.execute_block(plan)?
        };

        for (i, branch) in plan.unions.iter().enumerate() {
            // async_trait boxes the future, so recursion needs no extra pinning
            let branch_rows = self
                .execute(branch)
                .await
                .map_err(|e| e.in_union_branch(i))?;
            rows.extend(branch_rows);
        }

        // UNION has set semantics: drop duplicates, keep first occurrence.
        if !plan.unions.is_empty() {
            let mut seen = HashSet::new();
            rows.retain(|row| seen.insert(row.canonical()));
        }

        Ok(rows)
    }
}

/// Resolves `alias.column` to the bound row's cell value.
fn resolve(
    schemas: &HashMap<&str, &MemoryTable>,
    binding: &AliasBinding,
    column: &ColumnRef,
) -> Result<ScalarValue> {
    let table = schemas.get(column.alias.as_str()).ok_or_else(|| {
        LogiqError::SchemaError(format!("Alias '{}' is not in scope", column.alias))
    })?;
    let row_idx = binding.get(&column.alias).ok_or_else(|| {
        LogiqError::SchemaError(format!("Alias '{}' is not bound to a row", column.alias))
    })?;
    let col_idx = table.column_index(&column.column).ok_or_else(|| {
        LogiqError::SchemaError(format!(
            "Column '{}' does not exist in '{}'",
            column.column, column.alias
        ))
    })?;
    Ok(table.rows[*row_idx][col_idx].clone())
}

fn eval_filter(
    schemas: &HashMap<&str, &MemoryTable>,
    binding: &AliasBinding,
    filter: &Filter,
) -> Result<bool> {
    let cell = resolve(schemas, binding, &filter.column)?;

    let result = match (&filter.op, &filter.value) {
        (CompareOp::In, FilterValue::List(items)) => !cell.is_null() && items.contains(&cell),
        (CompareOp::NotIn, FilterValue::List(items)) => !cell.is_null() && !items.contains(&cell),
        (CompareOp::In | CompareOp::NotIn, FilterValue::Scalar(_)) => {
            return Err(LogiqError::ExecutionError(
                "Membership operator requires a list operand".into(),
            ))
        }
        (op, FilterValue::Scalar(operand)) => match cell.compare(operand) {
            // Null or type mismatch: condition is unknown, row dropped
            None => false,
            Some(ordering) => match op {
                CompareOp::Eq => ordering.is_eq(),
                CompareOp::NotEq => ordering.is_ne(),
                CompareOp::Gt => ordering.is_gt(),
                CompareOp::GtEq => ordering.is_ge(),
                CompareOp::Lt => ordering.is_lt(),
                CompareOp::LtEq => ordering.is_le(),
                CompareOp::In | CompareOp::NotIn => unreachable!("handled above"),
            },
        },
        (_, FilterValue::List(_)) => {
            return Err(LogiqError::ExecutionError(
                "Comparison operator requires a scalar operand".into(),
            ))
        }
    };

    Ok(result)
}

/// Projects a surviving binding into an output row. An empty projection
/// selects every column of every alias, named `alias.column`.
fn project(
    schemas: &HashMap<&str, &MemoryTable>,
    binding: &AliasBinding,
    plan: &QueryPlan,
) -> Result<Row> {
    let mut row = Row::new();
    if plan.projection.is_empty() {
        for table_ref in plan.aliases() {
            let table = schemas.get(table_ref.alias.as_str()).ok_or_else(|| {
                LogiqError::SchemaError(format!("Alias '{}' is not in scope", table_ref.alias))
            })?;
            for column in &table.columns {
                let value = resolve(
                    schemas,
                    binding,
                    &ColumnRef::new(table_ref.alias.clone(), column.clone()),
                )?;
                row.set(format!("{}.{}", table_ref.alias, column), value);
            }
        }
    } else {
        for output in &plan.projection {
            let value = resolve(schemas, binding, &output.source)?;
            row.set(output.name.clone(), value);
        }
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Join, JoinCondition, OutputColumn, TableRef};

    fn people_backend() -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        backend
            .load_table(
                "people",
                &["name", "favorite_color"],
                vec![
                    vec!["alice".into(), "blue".into()],
                    vec!["bob".into(), "green".into()],
                    vec!["carol".into(), "green".into()],
                ],
            )
            .unwrap();
        backend
    }

    fn scan_people() -> QueryPlan {
        let mut plan = QueryPlan::scan(TableRef::new("people", "t1"));
        plan.projection.push(OutputColumn {
            source: ColumnRef::new("t1", "name"),
            name: "person".into(),
        });
        plan
    }

    #[tokio::test]
    async fn test_scan_and_project() {
        let backend = people_backend();
        let rows = backend.execute(&scan_people()).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("person"), Some(&ScalarValue::String("alice".into())));
    }

    #[tokio::test]
    async fn test_filter_drops_rows() {
        let backend = people_backend();
        let mut plan = scan_people();
        plan.filters.push(Filter {
            column: ColumnRef::new("t1", "favorite_color"),
            op: CompareOp::Eq,
            value: FilterValue::Scalar("green".into()),
        });
        let rows = backend.execute(&plan).await.unwrap();
        let names: Vec<&str> = rows
            .iter()
            .map(|r| r.get("person").unwrap().as_string().unwrap())
            .collect();
        assert_eq!(names, vec!["bob", "carol"]);
    }

    #[tokio::test]
    async fn test_cross_join_multiplies_rows() {
        let mut backend = people_backend();
        backend
            .load_table(
                "colors",
                &["color"],
                vec![vec!["red".into()], vec!["blue".into()]],
            )
            .unwrap();
        let mut plan = scan_people();
        plan.joins.push(Join {
            table: TableRef::new("colors", "t2"),
            on: None,
        });
        let rows = backend.execute(&plan).await.unwrap();
        assert_eq!(rows.len(), 6);
    }

    #[tokio::test]
    async fn test_join_on_equality_skips_nulls() {
        let mut backend = MemoryBackend::new();
        backend
            .load_table(
                "a",
                &["k"],
                vec![vec![ScalarValue::Null], vec!["x".into()]],
            )
            .unwrap();
        backend
            .load_table(
                "b",
                &["k"],
                vec![vec![ScalarValue::Null], vec!["x".into()]],
            )
            .unwrap();
        let mut plan = QueryPlan::scan(TableRef::new("a", "t1"));
        plan.joins.push(Join {
            table: TableRef::new("b", "t2"),
            on: Some(JoinCondition {
                left: ColumnRef::new("t1", "k"),
                right: ColumnRef::new("t2", "k"),
            }),
        });
        let rows = backend.execute(&plan).await.unwrap();
        // Only the x = x pairing survives; null never joins.
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_join_alias_is_rejected() {
        let mut backend = people_backend();
        backend
            .load_table("colors", &["color"], vec![vec!["red".into()]])
            .unwrap();
        let mut plan = scan_people();
        plan.joins.push(Join {
            table: TableRef::new("colors", "t2"),
            on: None,
        });
        plan.joins.push(Join {
            table: TableRef::new("colors", "t2"),
            on: Some(JoinCondition {
                left: ColumnRef::new("t1", "favorite_color"),
                right: ColumnRef::new("t2", "color"),
            }),
        });
        let err = backend.execute(&plan).await.unwrap_err();
        assert!(matches!(err, LogiqError::ExecutionError(_)));
    }

    #[tokio::test]
    async fn test_union_dedups_rows() {
        let backend = people_backend();
        let plan = QueryPlan::union_of(vec![scan_people(), scan_people()]);
        let rows = backend.execute(&plan).await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_table_is_schema_error() {
        let backend = MemoryBackend::new();
        let err = backend.execute(&scan_people()).await.unwrap_err();
        assert!(matches!(err, LogiqError::SchemaError(_)));
    }

    #[tokio::test]
    async fn test_unknown_column_is_schema_error() {
        let backend = people_backend();
        let mut plan = scan_people();
        plan.filters.push(Filter {
            column: ColumnRef::new("t1", "no_such_column"),
            op: CompareOp::Eq,
            value: FilterValue::Scalar(1i64.into()),
        });
        let err = backend.execute(&plan).await.unwrap_err();
        assert!(matches!(err, LogiqError::SchemaError(_)));
    }
}
