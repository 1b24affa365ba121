use std::collections::HashMap;

/// Tracks the last displayed (integer-floored) value per ring and
/// reports whether a visible increase occurred, for one-shot animation
/// pulses. Fractional wobble inside the same integer never pulses.
#[derive(Debug, Default)]
pub struct RingPulseTracker {
    last_displayed: HashMap<String, i64>,
}

impl RingPulseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the floored value strictly increased since the last call
    /// for this key. The stored value is updated either way, so a key's
    /// first observation compares against a zero baseline and a decrease
    /// lowers the bar for the next increase.
    pub fn should_pulse(&mut self, key: &str, value: f64) -> bool {
        let displayed = value.floor() as i64;
        let previous = self
            .last_displayed
            .insert(key.to_string(), displayed)
            .unwrap_or(0);
        displayed > previous
    }
}
