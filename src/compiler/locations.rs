//! Variable location index.
//!
//! For every logical variable, tracks the ordered list of (alias, column)
//! sites where it occurs across the aliased predicates. The index is the
//! single source of truth for projection, join inference, and constraint
//! resolution.

use std::collections::HashMap;

use uuid::Uuid;

use crate::goal::Predicate;

/// One concrete occurrence site of a variable: its predicate's alias and
/// the bound column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableLocation {
    /// Identity of the variable occurring here.
    pub variable_id: Uuid,
    /// Alias of the predicate containing the site.
    pub alias: String,
    /// Table of the predicate containing the site.
    pub table: String,
    /// Bound column.
    pub column: String,
    /// The variable's display label, used for output column naming.
    pub display_name: String,
}

/// Ordered grouping of variable locations by variable id.
///
/// Iteration yields variables in first-appearance order (goal order, then
/// column order within a predicate); within a variable, locations keep the
/// same order. The first location of each variable is the one used for its
/// output column.
#[derive(Debug, Default)]
pub struct LocationIndex {
    order: Vec<Uuid>,
    groups: HashMap<Uuid, Vec<VariableLocation>>,
}

impl LocationIndex {
    /// Builds the index from aliased predicates.
    ///
    /// Predicates without an assigned alias contribute no locations; the
    /// compiler always aliases before indexing.
    #[must_use]
    pub fn build(predicates: &[Predicate]) -> Self {
        let mut index = LocationIndex::default();
        for pred in predicates {
            let Some(alias) = &pred.alias else { continue };
            for binding in &pred.columns {
                if let Some(var) = binding.value.as_var() {
                    index.push(VariableLocation {
                        variable_id: var.id(),
                        alias: alias.clone(),
                        table: pred.table.clone(),
                        column: binding.column.clone(),
                        display_name: var.name().to_string(),
                    });
                }
            }
        }
        index
    }

    fn push(&mut self, location: VariableLocation) {
        if !self.groups.contains_key(&location.variable_id) {
            self.order.push(location.variable_id);
        }
        self.groups
            .entry(location.variable_id)
            .or_default()
            .push(location);
    }

    /// Returns the ordered locations of a variable, or an empty slice if
    /// the variable has no occurrence site (a pure constraint handle).
    #[must_use]
    pub fn locations(&self, variable_id: Uuid) -> &[VariableLocation] {
        self.groups.get(&variable_id).map_or(&[], Vec::as_slice)
    }

    /// Returns the first occurrence site of a variable, if any.
    #[must_use]
    pub fn first_location(&self, variable_id: Uuid) -> Option<&VariableLocation> {
        self.locations(variable_id).first()
    }

    /// Iterates location groups in variable first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &[VariableLocation]> {
        self.order.iter().map(|id| self.locations(*id))
    }

    /// Returns the number of distinct variables indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no variable is bound anywhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
