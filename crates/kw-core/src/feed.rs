use crate::rings::{self, RingValue};
use crate::Mode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Durable snapshot written once per successful refresh cycle. Field
/// names stay camelCase so the dashboard and the GPT bridge keep reading
/// the document they already know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub key_progress: f64,
    #[serde(default)]
    pub key_target: f64,
    #[serde(default)]
    pub speed_progress: f64,
    #[serde(default)]
    pub speed_target: f64,
    #[serde(default)]
    pub handshake_progress: f64,
    #[serde(default)]
    pub handshake_target: f64,
    #[serde(default)]
    pub word_accuracy_score: f64,
    #[serde(default)]
    pub word_accuracy_target: f64,
}

impl ProgressSnapshot {
    /// Builds a snapshot from the cycle's computed ring values,
    /// timestamped now. Rings beyond the known four are ignored; the
    /// snapshot document has fixed columns.
    pub fn from_rings(mode: Mode, ring_values: &[RingValue]) -> Self {
        let mut snapshot = Self {
            timestamp: Utc::now().timestamp(),
            mode,
            ..Self::default()
        };
        for ring in ring_values {
            match ring.key.as_str() {
                rings::RING_KEYSTROKES => {
                    snapshot.key_progress = ring.progress;
                    snapshot.key_target = ring.target;
                }
                rings::RING_SPEED => {
                    snapshot.speed_progress = ring.progress;
                    snapshot.speed_target = ring.target;
                }
                rings::RING_BALANCE => {
                    snapshot.handshake_progress = ring.progress;
                    snapshot.handshake_target = ring.target;
                }
                rings::RING_ACCURACY => {
                    snapshot.word_accuracy_score = ring.progress;
                    snapshot.word_accuracy_target = ring.target;
                }
                _ => {}
            }
        }
        snapshot
    }
}

/// Narrative document the external insight generator writes. The monitor
/// only reads it; `progress` is kept loose since the generator echoes
/// whatever snapshot it saw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeFeed {
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub iteration: u64,
    #[serde(default)]
    pub analysis_text: String,
    #[serde(default)]
    pub diff: Vec<String>,
    #[serde(default)]
    pub diff_summary: String,
    #[serde(default)]
    pub progress: Value,
}

/// Mirror of the logger's health document. Absent or unparsable files
/// read as the offline default, never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl HealthStatus {
    pub fn offline() -> Self {
        Self {
            status: "Logger offline".to_string(),
            message: "Waiting for logger data".to_string(),
            timestamp: None,
        }
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::offline()
    }
}
