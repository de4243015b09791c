//! Engine facade: compile goal sets and run them on a backend.

use crate::backend::ExecutionBackend;
use crate::compiler;
use crate::error::Result;
use crate::goal::Goal;
use crate::plan::QueryPlan;
use crate::render;
use crate::types::QueryResult;

/// Configuration for an [`Engine`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Print the rendered SQL to stderr before executing (default: false).
    pub log_sql: bool,
}

/// Compiles goal sets and hands the plans to an execution backend.
///
/// Each run is independent: the engine keeps no state between calls
/// beyond the backend itself.
pub struct Engine<B: ExecutionBackend> {
    backend: B,
    config: EngineConfig,
}

impl<B: ExecutionBackend> Engine<B> {
    /// Creates an engine with default configuration.
    pub fn new(backend: B) -> Self {
        Engine {
            backend,
            config: EngineConfig::default(),
        }
    }

    /// Creates an engine with explicit configuration.
    pub fn with_config(backend: B, config: EngineConfig) -> Self {
        Engine { backend, config }
    }

    /// Returns a reference to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns a mutable reference to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Compiles a goal set without executing it.
    ///
    /// # Errors
    ///
    /// Returns a compile error per [`compiler::compile`].
    pub fn compile(&self, goals: &[Goal]) -> Result<QueryPlan> {
        compiler::compile(goals)
    }

    /// Compiles a goal set and renders it as SQL text.
    ///
    /// # Errors
    ///
    /// Returns a compile error per [`compiler::compile`].
    pub fn to_sql(&self, goals: &[Goal]) -> Result<String> {
        Ok(render::to_sql(&self.compile(goals)?))
    }

    /// Compiles a goal set and returns the plan tree as text.
    ///
    /// # Errors
    ///
    /// Returns a compile error per [`compiler::compile`].
    pub fn explain(&self, goals: &[Goal]) -> Result<String> {
        Ok(self.compile(goals)?.to_string())
    }

    /// Compiles and executes a goal set, collecting the backend's rows
    /// into a [`QueryResult`].
    ///
    /// # Errors
    ///
    /// Returns a compile error per [`compiler::compile`], or the
    /// backend's execution/schema error.
    pub async fn run(&self, goals: &[Goal]) -> Result<QueryResult> {
        let plan = self.compile(goals)?;

        if self.config.log_sql {
            eprintln!("[SQL] {}", render::to_sql(&plan));
        }

        let rows = self.backend.execute(&plan).await?;

        let mut result = QueryResult::new(plan.output_names());
        for row in rows {
            result.add_row(row);
        }
        Ok(result)
    }
}
