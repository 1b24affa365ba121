use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Rolling activity summary the capture pipeline writes to disk.
///
/// The schema is tolerant by design: the logger grows the document over
/// time and older files may miss whole sections, so every field defaults
/// instead of failing the read. Keys the monitor does not model are kept
/// in `extra` so they survive a round trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub letters: u64,
    #[serde(default)]
    pub actions: u64,
    #[serde(default)]
    pub words: u64,
    #[serde(default)]
    pub rage_clicks: u64,
    #[serde(default)]
    pub long_pauses: u64,
    #[serde(default)]
    pub first_event: Option<String>,
    #[serde(default)]
    pub last_event: Option<String>,
    #[serde(default)]
    pub key_counts: HashMap<String, u64>,
    #[serde(default)]
    pub daily_activity: HashMap<String, u64>,
    /// Transition counts: from-key -> to-key -> observations.
    #[serde(default)]
    pub key_pairs: HashMap<String, HashMap<String, u64>>,
    #[serde(default)]
    pub interval_stats: IntervalStats,
    #[serde(default)]
    pub typing_profile: TypingProfile,
    #[serde(default)]
    pub speed_points: SpeedPoints,
    #[serde(default)]
    pub word_accuracy: WordAccuracy,
    #[serde(default, flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntervalStats {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total_ms: u64,
    #[serde(default)]
    pub max_ms: u64,
    #[serde(default)]
    pub min_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypingProfile {
    /// Average gap between key presses, in milliseconds.
    #[serde(default)]
    pub avg_interval: f64,
    #[serde(default)]
    pub avg_press_length: f64,
    #[serde(default)]
    pub wpm: f64,
    #[serde(default)]
    pub avg_word_shape_samples: u64,
    #[serde(default)]
    pub long_pause_rate: f64,
}

/// Speed points are aggregated upstream; the monitor reads them as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeedPoints {
    #[serde(default)]
    pub earned: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordAccuracy {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub correct: u64,
    #[serde(default)]
    pub incorrect: u64,
}
