// Copyright (c) 2025 - Cowboy AI, Inc.
//! Audit Log
//!
//! Bounded record of every top-level operation the controller executed,
//! oldest dropped first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::domain::ResourceAddress;
use crate::operation::{Operation, OperationOutcome, Outcome};

/// One executed top-level operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub address: ResourceAddress,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_description: Option<String>,
}

impl AuditRecord {
    pub fn new(
        correlation_id: Uuid,
        timestamp: DateTime<Utc>,
        op: &Operation,
        outcome: &OperationOutcome,
    ) -> Self {
        Self {
            correlation_id,
            timestamp,
            operation: op.operation.clone(),
            address: op.address.clone(),
            outcome: outcome.outcome,
            failure_description: outcome.failure_description.clone(),
        }
    }
}

/// Ring buffer of audit records
#[derive(Debug, Clone)]
pub struct AuditLog {
    records: VecDeque<AuditRecord>,
    capacity: usize,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, record: AuditRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &AuditRecord> {
        self.records.iter()
    }

    pub fn find(&self, correlation_id: Uuid) -> Option<&AuditRecord> {
        self.records.iter().find(|r| r.correlation_id == correlation_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(n: u128) -> AuditRecord {
        let op = Operation::read_resource(ResourceAddress::root());
        AuditRecord::new(
            Uuid::from_u128(n),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            &op,
            &OperationOutcome::success(None),
        )
    }

    #[test]
    fn test_oldest_dropped_at_capacity() {
        let mut log = AuditLog::new(2);
        log.record(record(1));
        log.record(record(2));
        log.record(record(3));

        assert_eq!(log.len(), 2);
        assert!(log.find(Uuid::from_u128(1)).is_none());
        assert_eq!(
            log.records().map(|r| r.correlation_id).collect::<Vec<_>>(),
            vec![Uuid::from_u128(2), Uuid::from_u128(3)]
        );
    }

    #[test]
    fn test_record_keeps_failure_description() {
        let op = Operation::remove(ResourceAddress::parse("/subsystem=sar").unwrap());
        let outcome = OperationOutcome::failed("Resource /subsystem=sar not found");
        let record = AuditRecord::new(Uuid::from_u128(7), Utc::now(), &op, &outcome);
        assert_eq!(record.outcome, Outcome::Failed);
        assert_eq!(record.operation, "remove");
        assert!(record.failure_description.unwrap().contains("not found"));
    }
}
