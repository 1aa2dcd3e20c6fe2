//! Flow classifier
//!
//! A flow record is exactly three numeric features, flattened into one row
//! in a fixed order before classification.

use super::models::FlowModel;
use super::DetectionResult;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Required JSON fields, in model column order
pub const FLOW_FEATURES: [&str; 3] = ["Flow Byts/s", "Pkt Len Std", "Flow Pkts/s"];

/// Reasons a flow request is rejected before classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlowRejection {
    #[error("No data provided")]
    NoData,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for field: {0}")]
    InvalidValue(&'static str),
}

/// One network flow, as consumed by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowRecord {
    pub flow_bytes_per_sec: f64,
    pub packet_length_std: f64,
    pub flow_packets_per_sec: f64,
}

impl FlowRecord {
    /// Extract the record from a request body.
    ///
    /// Presence of every field is checked first, in column order, so the
    /// error always names the first missing field. Extra fields are ignored.
    pub fn from_json(body: &Value) -> Result<Self, FlowRejection> {
        let object = match body.as_object() {
            Some(object) if !object.is_empty() => object,
            _ => return Err(FlowRejection::NoData),
        };

        if let Some(missing) = FLOW_FEATURES.iter().find(|f| !object.contains_key(**f)) {
            return Err(FlowRejection::MissingField(missing));
        }

        let numeric = |field: &'static str| {
            object
                .get(field)
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite())
                .ok_or(FlowRejection::InvalidValue(field))
        };

        Ok(Self {
            flow_bytes_per_sec: numeric(FLOW_FEATURES[0])?,
            packet_length_std: numeric(FLOW_FEATURES[1])?,
            flow_packets_per_sec: numeric(FLOW_FEATURES[2])?,
        })
    }

    /// Model input row
    pub fn features(&self) -> [f64; FLOW_FEATURES.len()] {
        [
            self.flow_bytes_per_sec,
            self.packet_length_std,
            self.flow_packets_per_sec,
        ]
    }
}

/// Classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowVerdict {
    pub attack: bool,
    pub label: &'static str,
}

impl FlowVerdict {
    /// Any non-zero class is an attack
    pub fn from_class(class: i64) -> Self {
        let attack = class != 0;
        Self {
            attack,
            label: if attack { "Attack" } else { "Normal" },
        }
    }
}

/// Runs flow records through the classifier
pub struct FlowAnalyzer {
    model: Arc<dyn FlowModel>,
}

impl FlowAnalyzer {
    pub fn new(model: Arc<dyn FlowModel>) -> Self {
        Self { model }
    }

    pub fn classify(&self, record: &FlowRecord) -> DetectionResult<FlowVerdict> {
        let class = self.model.predict(&record.features())?;
        debug!(model = self.model.name(), class, "flow classified");
        Ok(FlowVerdict::from_class(class))
    }
}
