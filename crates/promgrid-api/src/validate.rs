//! Boundary validation for mutation requests.
//!
//! Bodies deserialize into option-field structs first; the validator then
//! checks the required-field contract and reports failures in the service's
//! long-standing wire message format. Nothing here touches the store or the
//! filesystem. Label contents are not inspected beyond presence of the
//! identity keys.

use serde::Deserialize;

use promgrid_core::{LABEL_INVENTORY_HOSTNAME, LABEL_ZONE, Labels, TargetIdentity, TargetRecord};

/// Required-field set for upsert requests.
pub const UPSERT_REQUIRED: &[&str] = &[
    "exporter",
    "target",
    "labels",
    "labels.zone",
    "labels.inventory_hostname",
];

/// Required-field set for delete requests.
pub const DELETE_REQUIRED: &[&str] = &[
    "exporter",
    "target",
    "labels.zone",
    "labels.inventory_hostname",
];

/// A mutation body failed the required-field contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The fields absent from the body.
    pub missing: Vec<&'static str>,
    /// The full required set for the rejected operation.
    pub required: &'static [&'static str],
}

impl ValidationError {
    /// Wire message, naming the full required set.
    pub fn message(&self) -> String {
        format!(
            "Input data invalid or miss some value, required: {:?}",
            self.required
        )
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing required fields: {:?}", self.missing)
    }
}

impl std::error::Error for ValidationError {}

/// Raw upsert body before validation.
#[derive(Debug, Deserialize)]
pub struct RawUpsert {
    pub exporter: Option<String>,
    pub target: Option<String>,
    pub labels: Option<Labels>,
}

/// Raw delete body before validation.
#[derive(Debug, Deserialize)]
pub struct RawDelete {
    pub exporter: Option<String>,
    pub target: Option<String>,
    #[serde(default)]
    pub labels: Labels,
}

/// Check an upsert body against [`UPSERT_REQUIRED`].
pub fn validate_upsert(raw: RawUpsert) -> Result<TargetRecord, ValidationError> {
    let mut missing = Vec::new();
    if raw.exporter.is_none() {
        missing.push("exporter");
    }
    if raw.target.is_none() {
        missing.push("target");
    }
    match &raw.labels {
        None => missing.push("labels"),
        Some(labels) => {
            if !labels.contains_key(LABEL_ZONE) {
                missing.push("labels.zone");
            }
            if !labels.contains_key(LABEL_INVENTORY_HOSTNAME) {
                missing.push("labels.inventory_hostname");
            }
        }
    }

    match (raw.exporter, raw.target, raw.labels, missing.is_empty()) {
        (Some(exporter), Some(target), Some(labels), true) => Ok(TargetRecord {
            exporter,
            target,
            labels,
        }),
        _ => Err(ValidationError {
            missing,
            required: UPSERT_REQUIRED,
        }),
    }
}

/// Deserialize and validate an upsert body.
///
/// A body whose fields have the wrong shape (e.g. non-string label values)
/// is rejected with the same wire message as a missing field.
pub fn upsert_from_value(value: serde_json::Value) -> Result<TargetRecord, ValidationError> {
    let raw: RawUpsert = serde_json::from_value(value).map_err(|_| ValidationError {
        missing: Vec::new(),
        required: UPSERT_REQUIRED,
    })?;
    validate_upsert(raw)
}

/// Deserialize and validate a delete body.
pub fn delete_from_value(value: serde_json::Value) -> Result<TargetIdentity, ValidationError> {
    let raw: RawDelete = serde_json::from_value(value).map_err(|_| ValidationError {
        missing: Vec::new(),
        required: DELETE_REQUIRED,
    })?;
    validate_delete(raw)
}

/// Check a delete body against [`DELETE_REQUIRED`] and build the identity
/// it addresses.
pub fn validate_delete(raw: RawDelete) -> Result<TargetIdentity, ValidationError> {
    let mut missing = Vec::new();
    if raw.exporter.is_none() {
        missing.push("exporter");
    }
    if raw.target.is_none() {
        missing.push("target");
    }
    let zone = raw.labels.get(LABEL_ZONE).cloned();
    let inventory_hostname = raw.labels.get(LABEL_INVENTORY_HOSTNAME).cloned();
    if zone.is_none() {
        missing.push("labels.zone");
    }
    if inventory_hostname.is_none() {
        missing.push("labels.inventory_hostname");
    }

    match (
        raw.exporter,
        raw.target,
        zone,
        inventory_hostname,
        missing.is_empty(),
    ) {
        (Some(exporter), Some(target), Some(zone), Some(inventory_hostname), true) => {
            Ok(TargetIdentity {
                exporter,
                target,
                zone,
                inventory_hostname,
            })
        }
        _ => Err(ValidationError {
            missing,
            required: DELETE_REQUIRED,
        }),
    }
}
