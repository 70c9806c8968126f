// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for the Management Model
//!
//! ```text
//! Client Request (JSON operation)
//!     ↓
//! ManagementService (this module)
//!     ↓
//! [bound version] TransformerRegistry::transform_operation
//!     ↓
//! OperationEngine under the tree lock
//!     ↓
//! OperationOutcome + audit record
//! ```
//!
//! [`ModelController`] is the long-lived service; [`KernelServices`] wraps
//! it with boot reporting for tests and tools.

pub mod controller;
pub mod kernel_services;

pub use controller::{ManagementService, ModelController};
pub use kernel_services::{KernelServices, KernelServicesBuilder};
