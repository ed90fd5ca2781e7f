//! Change kinds and change batches

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReconcileError, ReconcileResult};

/// Key carrying the source-device identifier in an ingress payload
pub const OVSDB_IDENTIFIER: &str = "ovsdb_identifier";

/// Every kind of hardware change a source device can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    NewLogicalSwitches,
    NewPhysicalSwitches,
    NewPhysicalPorts,
    NewPhysicalLocators,
    NewLocalMacs,
    NewRemoteMacs,
    ModifiedPhysicalPorts,
    DeletedLogicalSwitches,
    DeletedPhysicalSwitches,
    DeletedPhysicalPorts,
    DeletedPhysicalLocators,
    DeletedLocalMacs,
    DeletedRemoteMacs,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 13] = [
        ChangeKind::NewLogicalSwitches,
        ChangeKind::NewPhysicalSwitches,
        ChangeKind::NewPhysicalPorts,
        ChangeKind::NewPhysicalLocators,
        ChangeKind::NewLocalMacs,
        ChangeKind::NewRemoteMacs,
        ChangeKind::ModifiedPhysicalPorts,
        ChangeKind::DeletedLogicalSwitches,
        ChangeKind::DeletedPhysicalSwitches,
        ChangeKind::DeletedPhysicalPorts,
        ChangeKind::DeletedPhysicalLocators,
        ChangeKind::DeletedLocalMacs,
        ChangeKind::DeletedRemoteMacs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::NewLogicalSwitches => "new_logical_switches",
            ChangeKind::NewPhysicalSwitches => "new_physical_switches",
            ChangeKind::NewPhysicalPorts => "new_physical_ports",
            ChangeKind::NewPhysicalLocators => "new_physical_locators",
            ChangeKind::NewLocalMacs => "new_local_macs",
            ChangeKind::NewRemoteMacs => "new_remote_macs",
            ChangeKind::ModifiedPhysicalPorts => "modified_physical_ports",
            ChangeKind::DeletedLogicalSwitches => "deleted_logical_switches",
            ChangeKind::DeletedPhysicalSwitches => "deleted_physical_switches",
            ChangeKind::DeletedPhysicalPorts => "deleted_physical_ports",
            ChangeKind::DeletedPhysicalLocators => "deleted_physical_locators",
            ChangeKind::DeletedLocalMacs => "deleted_local_macs",
            ChangeKind::DeletedRemoteMacs => "deleted_remote_macs",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChangeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ReconcileError::UnknownKind(s.to_string()))
    }
}

/// One batch of changes from a single source device: kind -> ordered records.
///
/// Records stay raw JSON until the handler for their kind parses them, so a
/// shape error is reported against the kind and position it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeBatch {
    changes: BTreeMap<ChangeKind, Vec<Value>>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records for a kind (builder form)
    pub fn with(mut self, kind: ChangeKind, records: impl IntoIterator<Item = Value>) -> Self {
        self.changes.entry(kind).or_default().extend(records);
        self
    }

    pub fn push(&mut self, kind: ChangeKind, record: Value) {
        self.changes.entry(kind).or_default().push(record);
    }

    /// Build a batch from a kind-name keyed JSON object.
    ///
    /// The `ovsdb_identifier` key is skipped; any other key must name a known
    /// kind and hold an array (`null` counts as empty).
    pub fn from_json(object: &serde_json::Map<String, Value>) -> ReconcileResult<Self> {
        let mut batch = Self::new();
        for (key, value) in object {
            if key == OVSDB_IDENTIFIER {
                continue;
            }
            let kind: ChangeKind = key.parse()?;
            match value {
                Value::Array(records) => {
                    batch = batch.with(kind, records.iter().cloned());
                }
                Value::Null => {
                    batch.changes.entry(kind).or_default();
                }
                other => {
                    return Err(ReconcileError::InvalidBatch(format!(
                        "'{}' must be a list of records, got {}",
                        key,
                        json_type(other)
                    )))
                }
            }
        }
        Ok(batch)
    }

    /// Kinds present, with their records in arrival order
    pub fn iter(&self) -> impl Iterator<Item = (ChangeKind, &[Value])> {
        self.changes.iter().map(|(kind, records)| (*kind, records.as_slice()))
    }

    pub fn records(&self, kind: ChangeKind) -> &[Value] {
        self.changes.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of kinds present
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Total number of records across all kinds
    pub fn record_count(&self) -> usize {
        self.changes.values().map(Vec::len).sum()
    }
}

/// Split an ingress payload into its source identifier and change batch
pub fn parse_payload(payload: &Value) -> ReconcileResult<(String, ChangeBatch)> {
    let object = payload
        .as_object()
        .ok_or_else(|| ReconcileError::InvalidBatch("payload must be a JSON object".into()))?;

    let source = match object.get(OVSDB_IDENTIFIER) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => {
            return Err(ReconcileError::InvalidBatch(format!(
                "'{}' is required",
                OVSDB_IDENTIFIER
            )))
        }
    };

    Ok((source, ChangeBatch::from_json(object)?))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
