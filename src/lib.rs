// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration model kernel for the Composable Information Machine
//!
//! A hierarchical, versioned resource tree booted from subsystem documents
//! and changed only through validated, atomic management operations.
//! Callers bound to older subsystem versions see transformed views and have
//! their operations translated (or rejected) before execution.

pub mod audit;
pub mod boot;
pub mod config;
pub mod domain;
pub mod errors;
pub mod extension;
pub mod operation;
pub mod schema;
pub mod service;
pub mod subsystems;
pub mod transform;
pub mod tree;

// Re-export commonly used types
pub use config::KernelConfig;
pub use domain::{ModelValue, ModelVersion, PathElement, ResourceAddress};
pub use errors::{ModelError, ModelResult, OperationError};
pub use extension::{ManagementModel, SubsystemExtension};
pub use operation::{Operation, OperationEngine, OperationOutcome, Outcome};
pub use service::{KernelServices, KernelServicesBuilder, ManagementService, ModelController};
pub use transform::VersionBinding;
pub use tree::{Resource, ResourceTree};
