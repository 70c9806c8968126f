// Copyright (c) 2025 - Cowboy AI, Inc.
//! Kernel Services
//!
//! Boots a controller from subsystem documents and drives it the way a
//! management client would. A failed boot does not fail `build`; it is
//! reported by [`KernelServices::is_successful_boot`] and
//! [`KernelServices::boot_error`] so callers can assert on it.
//!
//! ```rust,ignore
//! let services = KernelServicesBuilder::new(KernelConfig::default())
//!     .extension(Ejb3Extension)
//!     .subsystem_xml(xml)
//!     .build()
//!     .await?;
//! assert!(services.is_successful_boot());
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::controller::{ManagementService, ModelController};
use crate::config::KernelConfig;
use crate::errors::{ModelError, ModelResult};
use crate::extension::{ManagementModel, ManagementModelBuilder, SubsystemExtension};
use crate::operation::{Operation, OperationOutcome};
use crate::transform::VersionBinding;

pub struct KernelServicesBuilder {
    config: KernelConfig,
    model: ManagementModelBuilder,
    documents: Vec<String>,
}

impl KernelServicesBuilder {
    pub fn new(config: KernelConfig) -> Self {
        Self {
            config,
            model: ManagementModel::builder(),
            documents: Vec::new(),
        }
    }

    pub fn extension<E: SubsystemExtension + 'static>(mut self, extension: E) -> Self {
        self.model = self.model.extension(extension);
        self
    }

    pub fn subsystem_xml(mut self, document: impl Into<String>) -> Self {
        self.documents.push(document.into());
        self
    }

    /// Register extensions and boot; only registration errors fail the build
    pub async fn build(self) -> ModelResult<KernelServices> {
        let model = Arc::new(self.model.build()?);
        let controller = ModelController::new(model, &self.config);
        let boot_error = controller.boot(&self.documents).await.err();
        if let Some(e) = &boot_error {
            warn!(error = %e, "Kernel boot failed");
        }
        Ok(KernelServices {
            controller,
            boot_error,
        })
    }
}

/// A booted (or failed) kernel
#[derive(Debug)]
pub struct KernelServices {
    controller: ModelController,
    boot_error: Option<ModelError>,
}

impl KernelServices {
    pub fn is_successful_boot(&self) -> bool {
        self.boot_error.is_none()
    }

    pub fn boot_error(&self) -> Option<&ModelError> {
        self.boot_error.as_ref()
    }

    pub fn controller(&self) -> &ModelController {
        &self.controller
    }

    pub async fn execute_operation(&self, op: Operation) -> OperationOutcome {
        self.controller.execute(op).await
    }

    /// Execute and return the result, failing unless the operation succeeds
    pub async fn execute_for_result(&self, op: Operation) -> ModelResult<Option<Value>> {
        let outcome = self.controller.execute(op).await;
        if outcome.is_success() {
            Ok(outcome.result)
        } else {
            Err(ModelError::UnexpectedOutcome(format!(
                "expected success, got failure: {}",
                outcome.failure_description()
            )))
        }
    }

    /// Execute and return the failed outcome, failing if the operation succeeds
    pub async fn execute_for_failure(&self, op: Operation) -> ModelResult<OperationOutcome> {
        let outcome = self.controller.execute(op).await;
        if outcome.is_success() {
            Err(ModelError::UnexpectedOutcome(format!(
                "expected failure, got success with result {}",
                outcome.result_string()
            )))
        } else {
            Ok(outcome)
        }
    }

    pub async fn read_whole_model(&self) -> Value {
        self.controller.read_model().await
    }

    pub async fn read_transformed_model(&self, binding: &VersionBinding) -> ModelResult<Value> {
        self.controller.read_transformed_model(binding).await
    }

    pub async fn execute_bound(&self, op: Operation, binding: &VersionBinding) -> OperationOutcome {
        self.controller.execute_bound(op, binding).await
    }
}
