use crate::summary::Summary;

/// Fixed left-to-right key order used by the balance metric. Position
/// distance in this string stands in for physical distance on the board.
const KEY_ORDER: &str = "qwertyuiopasdfghjklzxcvbnm";

/// Minimum position distance for a transition to count as a handshake.
const HANDSHAKE_DISTANCE: usize = 4;

/// Raw handshake sum is capped before speed adjustment.
const HANDSHAKE_CAP: f64 = 80.0;

/// Ring inputs derived from one validated summary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComputedMetrics {
    pub total_events: u64,
    pub avg_interval: f64,
    pub speed_score: f64,
    pub handshake_score: f64,
    /// Distinct "from" keys observed in the transition map. Diagnostic only.
    pub key_pair_count: usize,
}

fn key_position(symbol: &str) -> Option<usize> {
    let first = symbol.chars().next()?.to_ascii_lowercase();
    KEY_ORDER.find(first)
}

/// Converts a summary into the fixed set of ring inputs.
///
/// The handshake score rewards transitions between keys at least
/// `HANDSHAKE_DISTANCE` apart in `KEY_ORDER`, capped at `HANDSHAKE_CAP`,
/// then attenuated for slow typists: deliberate, spaced-out presses are
/// a weaker signal of ambidextrous flow. Symbols outside the fixed order
/// are excluded from the sum.
pub fn compute_metrics(summary: &Summary, handshake_threshold_ms: f64) -> ComputedMetrics {
    let avg_interval = summary.typing_profile.avg_interval;

    let mut distant_transitions: u64 = 0;
    for (src, targets) in &summary.key_pairs {
        let Some(src_index) = key_position(src) else {
            continue;
        };
        for (dst, count) in targets {
            let Some(dst_index) = key_position(dst) else {
                continue;
            };
            if src_index.abs_diff(dst_index) >= HANDSHAKE_DISTANCE {
                distant_transitions = distant_transitions.saturating_add(*count);
            }
        }
    }

    let capped = (distant_transitions as f64).min(HANDSHAKE_CAP);
    let factor = if handshake_threshold_ms > 0.0 {
        (handshake_threshold_ms / avg_interval.max(1.0)).min(1.0)
    } else {
        1.0
    };

    ComputedMetrics {
        total_events: summary.total_events,
        avg_interval,
        speed_score: summary.speed_points.earned as f64,
        handshake_score: (capped * factor).max(0.0),
        key_pair_count: summary.key_pairs.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_with_pairs(pairs: &[(&str, &str, u64)]) -> Summary {
        let mut summary = Summary::default();
        for (src, dst, count) in pairs {
            *summary
                .key_pairs
                .entry((*src).to_string())
                .or_default()
                .entry((*dst).to_string())
                .or_insert(0) += count;
        }
        summary
    }

    #[test]
    fn handshake_counts_only_distant_known_transitions() {
        // q(0) -> p(9) is distant; q(0) -> w(1) is not; ";" is outside
        // the fixed order entirely.
        let summary = summary_with_pairs(&[("q", "p", 10), ("q", "w", 50), (";", "q", 99)]);
        let metrics = compute_metrics(&summary, 0.0);
        assert_eq!(metrics.handshake_score, 10.0);
    }

    #[test]
    fn symbols_match_on_their_first_character() {
        // "shift" resolves to s(12); the jump to q(0) is distant.
        let summary = summary_with_pairs(&[("shift", "q", 7)]);
        let metrics = compute_metrics(&summary, 0.0);
        assert_eq!(metrics.handshake_score, 7.0);
    }

    #[test]
    fn transition_counts_saturate_instead_of_overflowing() {
        let summary = summary_with_pairs(&[("q", "p", u64::MAX), ("a", "l", u64::MAX)]);
        let metrics = compute_metrics(&summary, 0.0);
        assert_eq!(metrics.handshake_score, 80.0);
    }

    #[test]
    fn handshake_is_capped_regardless_of_magnitude() {
        let summary = summary_with_pairs(&[("q", "p", 1_000_000)]);
        let metrics = compute_metrics(&summary, 0.0);
        assert_eq!(metrics.handshake_score, 80.0);
    }

    #[test]
    fn handshake_is_invariant_to_insertion_order() {
        let forward = summary_with_pairs(&[("q", "p", 30), ("a", "l", 20), ("z", "m", 10)]);
        let reverse = summary_with_pairs(&[("z", "m", 10), ("a", "l", 20), ("q", "p", 30)]);
        let a = compute_metrics(&forward, 250.0);
        let b = compute_metrics(&reverse, 250.0);
        assert_eq!(a.handshake_score, b.handshake_score);
    }

    #[test]
    fn slow_typing_attenuates_handshake() {
        let mut summary = summary_with_pairs(&[("q", "p", 200)]);
        summary.typing_profile.avg_interval = 500.0;
        let metrics = compute_metrics(&summary, 250.0);
        // cap 80 * (250 / 500)
        assert_eq!(metrics.handshake_score, 40.0);
    }

    #[test]
    fn fast_typing_keeps_full_handshake_credit() {
        let mut summary = summary_with_pairs(&[("q", "p", 200)]);
        summary.typing_profile.avg_interval = 100.0;
        let metrics = compute_metrics(&summary, 250.0);
        assert_eq!(metrics.handshake_score, 80.0);
    }

    #[test]
    fn zero_interval_uses_unit_floor() {
        let mut summary = summary_with_pairs(&[("q", "p", 5)]);
        summary.typing_profile.avg_interval = 0.0;
        let metrics = compute_metrics(&summary, 250.0);
        // factor = min(1, 250 / max(0, 1)) = 1
        assert_eq!(metrics.handshake_score, 5.0);
    }

    #[test]
    fn speed_score_is_the_earned_counter() {
        let mut summary = Summary::default();
        summary.speed_points.earned = 73;
        summary.total_events = 9_000;
        let metrics = compute_metrics(&summary, 250.0);
        assert_eq!(metrics.speed_score, 73.0);
        assert_eq!(metrics.total_events, 9_000);
    }

    #[test]
    fn key_pair_count_is_distinct_from_keys() {
        let summary = summary_with_pairs(&[("q", "p", 1), ("q", "m", 1), ("a", "l", 1)]);
        let metrics = compute_metrics(&summary, 0.0);
        assert_eq!(metrics.key_pair_count, 2);
    }
}
