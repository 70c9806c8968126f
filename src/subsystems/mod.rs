// Copyright (c) 2025 - Cowboy AI, Inc.
//! Built-in subsystems

pub mod ejb3;
pub mod sar;

pub use ejb3::Ejb3Extension;
pub use sar::SarExtension;

use crate::errors::ModelResult;
use crate::extension::ManagementModel;

/// Model with every built-in subsystem registered
pub fn standard_model() -> ModelResult<ManagementModel> {
    ManagementModel::builder()
        .extension(Ejb3Extension)
        .extension(SarExtension)
        .build()
}
