use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const RING_KEYSTROKES: &str = "keystrokes";
pub const RING_SPEED: &str = "speed";
pub const RING_BALANCE: &str = "balance";
pub const RING_ACCURACY: &str = "accuracy";

pub const DEFAULT_KEYSTROKE_TARGET: f64 = 5000.0;
pub const DEFAULT_SPEED_TARGET: f64 = 120.0;
pub const DEFAULT_BALANCE_TARGET: f64 = 80.0;
pub const DEFAULT_ACCURACY_TARGET: f64 = 120.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RingAccent {
    Teal,
    Coral,
    Violet,
    Amber,
    Mint,
    Rose,
}

impl RingAccent {
    /// Reassignment order when two enabled rings collide on a color.
    pub const PALETTE: [RingAccent; 6] = [
        RingAccent::Teal,
        RingAccent::Coral,
        RingAccent::Violet,
        RingAccent::Amber,
        RingAccent::Mint,
        RingAccent::Rose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RingAccent::Teal => "teal",
            RingAccent::Coral => "coral",
            RingAccent::Violet => "violet",
            RingAccent::Amber => "amber",
            RingAccent::Mint => "mint",
            RingAccent::Rose => "rose",
        }
    }
}

impl fmt::Display for RingAccent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RingAccent {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "teal" => Ok(RingAccent::Teal),
            "coral" => Ok(RingAccent::Coral),
            "violet" => Ok(RingAccent::Violet),
            "amber" => Ok(RingAccent::Amber),
            "mint" => Ok(RingAccent::Mint),
            "rose" => Ok(RingAccent::Rose),
            other => Err(format!("Unknown accent: {other}")),
        }
    }
}

/// One configured progress ring. The default set of four can be replaced
/// through the app config; keys must stay unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingDefinition {
    pub key: String,
    pub title: String,
    pub accent: RingAccent,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub target: f64,
}

fn default_enabled() -> bool {
    true
}

impl RingDefinition {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        accent: RingAccent,
        target: f64,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            accent,
            enabled: true,
            target,
        }
    }
}

pub fn default_rings() -> Vec<RingDefinition> {
    vec![
        RingDefinition::new(
            RING_KEYSTROKES,
            "Keystrokes",
            RingAccent::Teal,
            DEFAULT_KEYSTROKE_TARGET,
        ),
        RingDefinition::new(
            RING_SPEED,
            "Speed points",
            RingAccent::Coral,
            DEFAULT_SPEED_TARGET,
        ),
        RingDefinition::new(
            RING_BALANCE,
            "Keyboard balance",
            RingAccent::Violet,
            DEFAULT_BALANCE_TARGET,
        ),
        RingDefinition::new(
            RING_ACCURACY,
            "Word accuracy",
            RingAccent::Amber,
            DEFAULT_ACCURACY_TARGET,
        ),
    ]
}

/// Reassigns accents so no two enabled rings share a color. The first
/// ring with a given accent keeps it; later collisions take the next
/// free palette entry. Disabled rings are left alone.
pub fn resolve_accent_collisions(rings: &mut [RingDefinition]) {
    let mut used: Vec<RingAccent> = Vec::new();
    for ring in rings.iter_mut().filter(|ring| ring.enabled) {
        if used.contains(&ring.accent) {
            if let Some(free) = RingAccent::PALETTE
                .iter()
                .find(|accent| !used.contains(accent))
            {
                ring.accent = *free;
            }
        }
        used.push(ring.accent);
    }
}

/// A ring's computed value for one refresh cycle. Progress is clamped to
/// `[0, target]` at construction so the invariant holds everywhere the
/// value travels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingValue {
    pub key: String,
    pub progress: f64,
    pub target: f64,
}

impl RingValue {
    pub fn new(key: impl Into<String>, progress: f64, target: f64) -> Self {
        let target = if target.is_finite() { target.max(0.0) } else { 0.0 };
        let progress = if progress.is_finite() {
            progress.max(0.0).min(target)
        } else {
            0.0
        };
        Self {
            key: key.into(),
            progress,
            target,
        }
    }

    pub fn complete(&self) -> bool {
        self.target > 0.0 && self.progress >= self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_value_clamps_to_target_bounds() {
        let over = RingValue::new(RING_SPEED, 180.0, 120.0);
        assert_eq!(over.progress, 120.0);
        assert!(over.complete());

        let under = RingValue::new(RING_SPEED, -4.0, 120.0);
        assert_eq!(under.progress, 0.0);
        assert!(!under.complete());
    }

    #[test]
    fn default_rings_have_unique_keys_and_accents() {
        let rings = default_rings();
        assert_eq!(rings.len(), 4);
        for (index, ring) in rings.iter().enumerate() {
            for other in &rings[index + 1..] {
                assert_ne!(ring.key, other.key);
                assert_ne!(ring.accent, other.accent);
            }
        }
    }

    #[test]
    fn accent_collisions_are_reassigned_from_palette() {
        let mut rings = vec![
            RingDefinition::new("a", "A", RingAccent::Teal, 10.0),
            RingDefinition::new("b", "B", RingAccent::Teal, 10.0),
            RingDefinition::new("c", "C", RingAccent::Coral, 10.0),
        ];
        resolve_accent_collisions(&mut rings);
        assert_eq!(rings[0].accent, RingAccent::Teal);
        assert_ne!(rings[1].accent, RingAccent::Teal);
        assert_ne!(rings[1].accent, rings[2].accent);
    }

    #[test]
    fn disabled_rings_do_not_reserve_accents() {
        let mut rings = vec![
            RingDefinition {
                enabled: false,
                ..RingDefinition::new("off", "Off", RingAccent::Teal, 10.0)
            },
            RingDefinition::new("on", "On", RingAccent::Teal, 10.0),
        ];
        resolve_accent_collisions(&mut rings);
        assert_eq!(rings[1].accent, RingAccent::Teal);
    }
}
