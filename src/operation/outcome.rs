// Copyright (c) 2025 - Cowboy AI, Inc.
//! Operation Outcomes
//!
//! Every top-level operation produces exactly one outcome record. Callers
//! branch on [`Outcome`] and read `failure-description`; errors never cross
//! the operation boundary any other way.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::OperationError;

/// Success / failure discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failed,
}

/// Response to a management operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OperationOutcome {
    pub outcome: Outcome,

    /// Read value or step results; absent for writes and undefined reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_description: Option<String>,
}

impl OperationOutcome {
    pub fn success(result: Option<Value>) -> Self {
        Self {
            outcome: Outcome::Success,
            // An undefined read is reported as an absent result
            result: result.filter(|value| !value.is_null()),
            failure_description: None,
        }
    }

    pub fn failed(description: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failed,
            result: None,
            failure_description: Some(description.into()),
        }
    }

    pub fn from_error(error: &OperationError) -> Self {
        Self::failed(error.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    /// Result rendered as text; `undefined` when there is none
    pub fn result_string(&self) -> String {
        match &self.result {
            None => "undefined".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn failure_description(&self) -> &str {
        self.failure_description.as_deref().unwrap_or("")
    }
}

impl From<Result<Option<Value>, OperationError>> for OperationOutcome {
    fn from(result: Result<Option<Value>, OperationError>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(e) => Self::from_error(&e),
        }
    }
}
