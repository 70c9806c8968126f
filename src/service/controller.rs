// Copyright (c) 2025 - Cowboy AI, Inc.
//! Model Controller
//!
//! Owns the live resource tree and serializes access to it:
//!
//! ```text
//! Operation ──► correlation id ──► [bound caller] inbound transform
//!                                        │
//!              read-only? ── yes ──► shared lock   ──► engine.execute_read
//!                        └── no ───► exclusive lock ──► engine.execute (composite = one lock)
//!                                        │        read steps of bound callers see
//!                                        │        the outbound-transformed view
//!                                   audit record
//! ```
//!
//! A whole top-level operation, composites included, runs under one lock
//! acquisition. Reads share the lock with each other, never with a write.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::audit::{AuditLog, AuditRecord};
use crate::boot::{boot_operations, BootError};
use crate::config::KernelConfig;
use crate::errors::{ModelError, ModelResult, OperationError};
use crate::extension::ManagementModel;
use crate::domain::{ModelValue, ResourceAddress};
use crate::operation::{
    render_resource, CurrentView, Operation, OperationEngine, OperationOutcome, ReadView,
};
use crate::transform::{TransformerRegistry, VersionBinding};
use crate::tree::{Resource, ResourceTree};

/// Asynchronous management interface of a running kernel
#[async_trait]
pub trait ManagementService: Send + Sync {
    /// Execute an operation against the current model
    async fn execute(&self, op: Operation) -> OperationOutcome;

    /// Execute an operation written against the versions in `binding`
    async fn execute_bound(&self, op: Operation, binding: &VersionBinding) -> OperationOutcome;

    /// Stored model as JSON, without defaults
    async fn read_model(&self) -> Value;
}

/// Shared resource tree plus the engine operating on it
#[derive(Debug)]
pub struct ModelController {
    model: Arc<ManagementModel>,
    engine: OperationEngine,
    tree: RwLock<ResourceTree>,
    audit: Mutex<AuditLog>,
}

impl ModelController {
    pub fn new(model: Arc<ManagementModel>, config: &KernelConfig) -> Self {
        let engine = OperationEngine::new(model.schema().clone(), config.resolver())
            .with_max_composite_steps(config.max_composite_steps);
        Self {
            model,
            engine,
            tree: RwLock::new(ResourceTree::new()),
            audit: Mutex::new(AuditLog::new(config.audit_capacity)),
        }
    }

    pub fn model(&self) -> &ManagementModel {
        &self.model
    }

    /// Build the tree from subsystem documents
    ///
    /// All documents become one composite on an empty tree: either every
    /// resource is created or the tree stays empty.
    pub async fn boot<S: AsRef<str>>(&self, documents: &[S]) -> ModelResult<()> {
        let mut steps = Vec::new();
        for document in documents {
            steps.extend(boot_operations(&self.model, document.as_ref())?);
        }
        let count = steps.len();

        let mut tree = self.tree.write().await;
        if !tree.root().children().is_empty() {
            return Err(BootError::Rejected("model is already booted".to_string()).into());
        }

        let outcome = self.engine.execute(&mut tree, &Operation::composite(steps));
        if !outcome.is_success() {
            warn!(failure = outcome.failure_description(), "Boot rejected");
            return Err(BootError::Rejected(outcome.failure_description().to_string()).into());
        }

        tree.verify(self.engine.schema()).map_err(|e| {
            error!(error = %e, "Model integrity violated after boot");
            ModelError::Integrity(e)
        })?;

        info!(
            documents = documents.len(),
            operations = count,
            "Model booted"
        );
        Ok(())
    }

    async fn run(&self, op: &Operation, view: &dyn ReadView) -> OperationOutcome {
        if op.is_read_only() {
            let tree = self.tree.read().await;
            self.engine.execute_read_with_view(&tree, op, view)
        } else {
            let mut tree = self.tree.write().await;
            self.engine.execute_with_view(&mut tree, op, view)
        }
    }

    async fn record(&self, correlation_id: Uuid, op: &Operation, outcome: &OperationOutcome) {
        let record = AuditRecord::new(correlation_id, Utc::now(), op, outcome);
        self.audit.lock().await.record(record);
    }

    /// Stored model as JSON for bound callers; fails if any bound subsystem
    /// holds values its legacy version cannot represent
    pub async fn read_transformed_model(&self, binding: &VersionBinding) -> ModelResult<Value> {
        let tree = self.tree.read().await;
        let view = self.model.transformers().transform_model(tree.root(), binding)?;
        Ok(render_resource(self.engine.schema(), &view, false, true))
    }

    /// Copy of the current tree
    pub async fn snapshot(&self) -> ResourceTree {
        self.tree.read().await.clone()
    }

    pub async fn audit_records(&self) -> Vec<AuditRecord> {
        self.audit.lock().await.records().cloned().collect()
    }

    /// Check every stored resource against its schema
    pub async fn verify_integrity(&self) -> ModelResult<()> {
        let tree = self.tree.read().await;
        tree.verify(self.engine.schema()).map_err(|e| {
            error!(error = %e, "Model integrity violated");
            ModelError::Integrity(e)
        })
    }
}

/// Reads as seen by a caller bound to older subsystem versions
struct BoundView<'a> {
    transformers: &'a TransformerRegistry,
    binding: &'a VersionBinding,
}

impl ReadView for BoundView<'_> {
    /// Without `recursive` only the resource's own attributes are transformed,
    /// so children holding values the legacy version rejects do not fail it
    fn resource<'r>(
        &self,
        address: &ResourceAddress,
        resource: &'r Resource,
        recursive: bool,
    ) -> Result<Cow<'r, Resource>, OperationError> {
        let view = if recursive {
            self.transformers.transform_view(address, resource, self.binding)
        } else {
            self.transformers.transform_view(address, &resource.shallow(), self.binding)
        };
        Ok(Cow::Owned(view?))
    }

    fn attribute(
        &self,
        address: &ResourceAddress,
        resource: &Resource,
        name: &str,
    ) -> Result<ModelValue, OperationError> {
        Ok(self
            .transformers
            .transform_attribute(address, resource, name, self.binding)?)
    }
}

/// Assign a correlation id when the caller sent none
fn correlated(op: Operation) -> (Uuid, Operation) {
    match op.correlation_id() {
        Some(id) => (id, op),
        None => {
            let id = Uuid::now_v7();
            (id, op.with_correlation_id(id))
        }
    }
}

#[async_trait]
impl ManagementService for ModelController {
    async fn execute(&self, op: Operation) -> OperationOutcome {
        let (correlation_id, op) = correlated(op);
        let outcome = self.run(&op, &CurrentView).await;
        self.record(correlation_id, &op, &outcome).await;
        outcome
    }

    async fn execute_bound(&self, op: Operation, binding: &VersionBinding) -> OperationOutcome {
        let (correlation_id, op) = correlated(op);

        let outcome = match self
            .model
            .transformers()
            .transform_operation(self.engine.schema(), &op, binding)
        {
            Err(e) => {
                warn!(
                    operation = %op.operation,
                    address = %op.address,
                    correlation_id = %correlation_id,
                    error = %e,
                    "Operation rejected for bound version"
                );
                OperationOutcome::from_error(&OperationError::from(e))
            }
            Ok(current) => {
                let view = BoundView {
                    transformers: self.model.transformers(),
                    binding,
                };
                self.run(&current, &view).await
            }
        };

        self.record(correlation_id, &op, &outcome).await;
        outcome
    }

    async fn read_model(&self) -> Value {
        let tree = self.tree.read().await;
        render_resource(self.engine.schema(), tree.root(), false, true)
    }
}
