use crate::summary::Summary;

/// Rescale applied in sample mode so the canned data set moves like a
/// small live one. Timing is pinned to a fixed average interval so demo
/// behavior is deterministic regardless of the sample file's real
/// timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleTransform {
    pub ratio: f64,
    pub fixed_avg_interval: f64,
}

impl Default for SampleTransform {
    fn default() -> Self {
        Self {
            ratio: 0.05,
            fixed_avg_interval: 210.0,
        }
    }
}

impl SampleTransform {
    pub fn new(ratio: f64, fixed_avg_interval: f64) -> Self {
        Self {
            ratio,
            fixed_avg_interval,
        }
    }

    /// Scales the volume counters by `ratio` (clamped to `[0, 1]`) and
    /// overrides the derived average interval. Transition counts and
    /// word accuracy are left untouched.
    pub fn apply(&self, summary: &mut Summary) {
        let ratio = self.ratio.clamp(0.0, 1.0);

        summary.total_events = scale(summary.total_events, ratio);
        summary.letters = scale(summary.letters, ratio);
        summary.actions = scale(summary.actions, ratio);
        summary.words = scale(summary.words, ratio);
        summary.rage_clicks = scale(summary.rage_clicks, ratio);
        summary.long_pauses = scale(summary.long_pauses, ratio);
        for count in summary.key_counts.values_mut() {
            *count = scale(*count, ratio);
        }
        for count in summary.daily_activity.values_mut() {
            *count = scale(*count, ratio);
        }

        summary.typing_profile.avg_interval = self.fixed_avg_interval;
    }
}

/// Rounded scaling that keeps nonzero sources visible: a positive
/// counter scaled by a positive ratio lands at 1 or more, so demo data
/// still shows movement.
fn scale(value: u64, ratio: f64) -> u64 {
    if value == 0 || ratio <= 0.0 {
        return 0;
    }
    ((value as f64 * ratio).round() as u64).max(1)
}
