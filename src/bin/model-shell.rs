// Copyright (c) 2025 - Cowboy AI, Inc.
//! Model Shell
//!
//! Boots the standard subsystems from a document and executes one JSON
//! operation per stdin line, writing one JSON outcome per stdout line.
//!
//! ```text
//! $ CIM_SUBSYSTEM_XML=ejb3.xml model-shell
//! {"operation":"read-attribute","address":[{"subsystem":"ejb3"}],"name":"statistics-enabled"}
//! {"outcome":"success","result":false}
//! ```
//!
//! Environment:
//! - `CIM_SUBSYSTEM_XML`: boot document path (optional; empty model otherwise)
//! - `CIM_MODEL_BINDING`: comma separated `subsystem=version` pairs; operations
//!   are then executed as a caller bound to those versions
//! - `CIM_MODEL_*`: see `KernelConfig::from_env`
//! - `RUST_LOG`: log filter, logs go to stderr

use anyhow::{Context, Result};
use cim_config_model::{
    config::KernelConfig,
    domain::ModelVersion,
    operation::{Operation, OperationOutcome},
    service::{ManagementService, ModelController},
    subsystems::standard_model,
    transform::VersionBinding,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

fn binding_from_env() -> Result<Option<VersionBinding>> {
    let Ok(raw) = std::env::var("CIM_MODEL_BINDING") else {
        return Ok(None);
    };

    let mut binding = VersionBinding::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (subsystem, version) = pair
            .split_once('=')
            .with_context(|| format!("Invalid binding '{}', expected subsystem=version", pair))?;
        let version: ModelVersion = version
            .parse()
            .with_context(|| format!("Invalid version in binding '{}'", pair))?;
        binding = binding.bind(subsystem.trim(), version);
    }
    Ok(Some(binding))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = KernelConfig::from_env().context("Failed to load kernel configuration")?;
    let binding = binding_from_env()?;
    let model = Arc::new(standard_model().context("Failed to register subsystems")?);
    let controller = ModelController::new(model, &config);

    if let Ok(path) = std::env::var("CIM_SUBSYSTEM_XML") {
        let document = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read boot document {}", path))?;
        controller
            .boot(&[document])
            .await
            .with_context(|| format!("Failed to boot from {}", path))?;
        info!(path = %path, "Booted subsystem document");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let outcome = match serde_json::from_str::<Operation>(line) {
            Ok(op) => {
                debug!(operation = %op.operation, address = %op.address, "Executing");
                match &binding {
                    Some(binding) => controller.execute_bound(op, binding).await,
                    None => controller.execute(op).await,
                }
            }
            Err(e) => OperationOutcome::failed(format!("Malformed operation: {}", e)),
        };

        let mut response = serde_json::to_string(&outcome).context("Failed to encode outcome")?;
        response.push('\n');
        stdout.write_all(response.as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}
