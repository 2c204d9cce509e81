use serde::{Deserialize, Serialize};

use crate::state::models::ConfigMap;

/// How a configuration key drifted from the stored baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftType {
    /// Key present in the current config but absent from the baseline.
    Added,
    /// Key present in the baseline but absent from the current config.
    Removed,
    /// Key present in both with differing values.
    Changed,
}

/// A single configuration difference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftDiff {
    pub key: String,
    pub diff_type: DriftType,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
}

/// Drift report for one resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub resource_id: String,
    pub drifted: bool,
    pub diffs: Vec<DriftDiff>,
}

/// Compare a stored config baseline against a current config.
///
/// Comparison is flat: nested values are compared by whole-value equality,
/// not recursively diffed. Output is sorted by key for determinism.
pub fn diff_configs(stored: &ConfigMap, current: &ConfigMap) -> Vec<DriftDiff> {
    let mut diffs = Vec::new();

    for (key, old_value) in stored {
        match current.get(key) {
            None => diffs.push(DriftDiff {
                key: key.clone(),
                diff_type: DriftType::Removed,
                old_value: Some(old_value.clone()),
                new_value: None,
            }),
            Some(new_value) if new_value != old_value => diffs.push(DriftDiff {
                key: key.clone(),
                diff_type: DriftType::Changed,
                old_value: Some(old_value.clone()),
                new_value: Some(new_value.clone()),
            }),
            Some(_) => {}
        }
    }

    for (key, new_value) in current {
        if !stored.contains_key(key) {
            diffs.push(DriftDiff {
                key: key.clone(),
                diff_type: DriftType::Added,
                old_value: None,
                new_value: Some(new_value.clone()),
            });
        }
    }

    diffs.sort_by(|a, b| a.key.cmp(&b.key));
    diffs
}
