// Copyright (c) 2025 - Cowboy AI, Inc.
//! Operation Engine
//!
//! Executes one top-level operation against a tree the caller has exclusive
//! access to. Every mutation is applied immediately and its inverse pushed on
//! an undo log, so later composite steps observe earlier ones. If any step or
//! the final reference check fails, the log is replayed backwards and the
//! tree is left exactly as it was.
//!
//! ```text
//! Received ──steps + checks ok──> Validated ──undo log dropped──> Applied
//!     └────────any failure, rollback──────────────────────────> Rejected
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use super::handlers::{self, apply_change, ModelChange};
use super::lifecycle::{OperationStage, StageInput, StateMachine};
use super::outcome::OperationOutcome;
use super::request::{Operation, OperationKind};
use super::view::{CurrentView, ReadView};
use crate::domain::{ExpressionResolver, ResourceAddress};
use crate::errors::OperationError;
use crate::schema::SchemaRegistry;
use crate::tree::ResourceTree;

/// Default cap on the number of steps in one composite
pub const DEFAULT_MAX_COMPOSITE_STEPS: usize = 1024;

type StepResult = Result<Option<Value>, OperationError>;

/// Check deferred until every step of a top-level operation has run
#[derive(Debug, Clone)]
enum DeferredCheck {
    References(ResourceAddress),
    Removal(ResourceAddress),
}

/// Per top-level operation bookkeeping
struct Execution {
    stage: OperationStage,
    undo: Vec<ModelChange>,
    checks: Vec<DeferredCheck>,
}

impl Execution {
    fn new() -> Self {
        Self {
            stage: OperationStage::Received,
            undo: Vec::new(),
            checks: Vec::new(),
        }
    }

    fn advance(&mut self, input: StageInput) {
        match self.stage.transition(&input) {
            Ok(next) => {
                debug!(from = %self.stage, to = %next, "Operation stage transition");
                self.stage = next;
            }
            Err(e) => error!(error = %e, "Invalid operation stage transition"),
        }
    }
}

/// Validates and applies operations against a resource tree
#[derive(Debug, Clone)]
pub struct OperationEngine {
    schema: Arc<SchemaRegistry>,
    resolver: ExpressionResolver,
    max_composite_steps: usize,
}

impl OperationEngine {
    pub fn new(schema: Arc<SchemaRegistry>, resolver: ExpressionResolver) -> Self {
        Self {
            schema,
            resolver,
            max_composite_steps: DEFAULT_MAX_COMPOSITE_STEPS,
        }
    }

    pub fn with_max_composite_steps(mut self, max: usize) -> Self {
        self.max_composite_steps = max;
        self
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Execute a top-level operation; all or nothing
    pub fn execute(&self, tree: &mut ResourceTree, op: &Operation) -> OperationOutcome {
        self.execute_with_view(tree, op, &CurrentView)
    }

    /// Execute a top-level operation whose read steps see the tree through `view`
    pub fn execute_with_view(
        &self,
        tree: &mut ResourceTree,
        op: &Operation,
        view: &dyn ReadView,
    ) -> OperationOutcome {
        let mut execution = Execution::new();

        let result = self
            .check_step_budget(op)
            .and_then(|_| self.run_step(tree, op, &mut execution, view))
            .and_then(|value| self.run_checks(tree, &execution.checks).map(|_| value));

        match result {
            Ok(value) => {
                execution.advance(StageInput::Validate);
                execution.undo.clear();
                execution.advance(StageInput::Commit);
                OperationOutcome::success(value)
            }
            Err(e) => {
                self.rollback(tree, std::mem::take(&mut execution.undo));
                execution.advance(StageInput::Reject);
                warn!(
                    operation = %op.operation,
                    address = %op.address,
                    correlation_id = ?op.correlation_id(),
                    error = %e,
                    "Operation rejected"
                );
                OperationOutcome::from_error(&e)
            }
        }
    }

    /// Execute an operation that only reads; mutating operations are refused
    pub fn execute_read(&self, tree: &ResourceTree, op: &Operation) -> OperationOutcome {
        self.execute_read_with_view(tree, op, &CurrentView)
    }

    pub fn execute_read_with_view(
        &self,
        tree: &ResourceTree,
        op: &Operation,
        view: &dyn ReadView,
    ) -> OperationOutcome {
        if !op.is_read_only() {
            return OperationOutcome::failed(format!(
                "Operation '{}' is not read-only",
                op.operation
            ));
        }

        let mut execution = Execution::new();
        match self
            .check_step_budget(op)
            .and_then(|_| self.read_step(tree, op, view))
        {
            Ok(value) => {
                execution.advance(StageInput::Validate);
                execution.advance(StageInput::Commit);
                OperationOutcome::success(value)
            }
            Err(e) => {
                execution.advance(StageInput::Reject);
                debug!(
                    operation = %op.operation,
                    address = %op.address,
                    error = %e,
                    "Read rejected"
                );
                OperationOutcome::from_error(&e)
            }
        }
    }

    /// Operation kind; only `add` takes attribute values as extra request keys
    fn kind(op: &Operation) -> Result<OperationKind, OperationError> {
        let kind = op
            .kind()
            .ok_or_else(|| OperationError::Unsupported(format!("Unknown operation '{}'", op.operation)))?;
        match op.parameters.keys().next() {
            Some(parameter) if kind != OperationKind::Add => Err(OperationError::Unsupported(format!(
                "Operation '{}' does not accept parameter '{}'",
                op.operation, parameter
            ))),
            _ => Ok(kind),
        }
    }

    /// Steps are counted across every nesting level of a composite
    fn check_step_budget(&self, op: &Operation) -> Result<(), OperationError> {
        let steps = op.step_count();
        if steps > self.max_composite_steps {
            return Err(OperationError::Unsupported(format!(
                "Composite operation has {} steps; at most {} are allowed",
                steps, self.max_composite_steps
            )));
        }
        Ok(())
    }

    fn run_step(
        &self,
        tree: &mut ResourceTree,
        op: &Operation,
        execution: &mut Execution,
        view: &dyn ReadView,
    ) -> StepResult {
        let schema = self.schema.as_ref();
        let (change, check) = match Self::kind(op)? {
            OperationKind::Composite => {
                return self.composite(&op.steps, |step| self.run_step(tree, step, execution, view));
            }
            OperationKind::ReadAttribute | OperationKind::ReadResource => {
                return self.read_step(tree, op, view);
            }
            OperationKind::Add => (
                handlers::handle_add(schema, tree, op)?,
                DeferredCheck::References(op.address.clone()),
            ),
            OperationKind::Remove => (
                handlers::handle_remove(tree, op)?,
                DeferredCheck::Removal(op.address.clone()),
            ),
            OperationKind::WriteAttribute => (
                handlers::handle_write_attribute(schema, tree, op)?,
                DeferredCheck::References(op.address.clone()),
            ),
            OperationKind::UndefineAttribute => (
                handlers::handle_undefine_attribute(schema, tree, op)?,
                DeferredCheck::References(op.address.clone()),
            ),
        };

        let inverse = apply_change(tree, change)?;
        execution.undo.push(inverse);
        execution.checks.push(check);
        Ok(None)
    }

    fn read_step(&self, tree: &ResourceTree, op: &Operation, view: &dyn ReadView) -> StepResult {
        let schema = self.schema.as_ref();
        match Self::kind(op)? {
            OperationKind::ReadAttribute => {
                handlers::read_attribute(schema, &self.resolver, tree, op, view).map(Some)
            }
            OperationKind::ReadResource => handlers::read_resource(schema, tree, op, view).map(Some),
            OperationKind::Composite => {
                self.composite(&op.steps, |step| self.read_step(tree, step, view))
            }
            _ => Err(OperationError::Unsupported(format!(
                "Operation '{}' is not read-only",
                op.operation
            ))),
        }
    }

    /// Run steps in order, stopping at the first failure
    fn composite<F>(&self, steps: &[Operation], mut run: F) -> StepResult
    where
        F: FnMut(&Operation) -> StepResult,
    {
        let mut results = Map::new();
        for (index, step) in steps.iter().enumerate() {
            let number = index + 1;
            let result = run(step).map_err(|e| OperationError::CompositeStepFailed {
                step: number,
                source: Box::new(e),
            })?;

            let mut outcome = Map::new();
            outcome.insert("outcome".to_string(), Value::from("success"));
            if let Some(result) = result.filter(|value| !value.is_null()) {
                outcome.insert("result".to_string(), result);
            }
            results.insert(format!("step-{}", number), Value::Object(outcome));
        }
        Ok(Some(Value::Object(results)))
    }

    fn run_checks(&self, tree: &ResourceTree, checks: &[DeferredCheck]) -> Result<(), OperationError> {
        for check in checks {
            match check {
                DeferredCheck::References(address) => {
                    handlers::check_references(&self.schema, tree, address)?
                }
                DeferredCheck::Removal(address) => handlers::check_removal(&self.schema, tree, address)?,
            }
        }
        Ok(())
    }

    fn rollback(&self, tree: &mut ResourceTree, undo: Vec<ModelChange>) {
        if !undo.is_empty() {
            debug!(changes = undo.len(), "Rolling back applied changes");
        }
        for change in undo.into_iter().rev() {
            if let Err(e) = apply_change(tree, change) {
                error!(error = %e, "Rollback failed; the model may be inconsistent");
            }
        }
    }
}
