use crate::rings::{RingDefinition, RingValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Threshold-crossing events the notifier emits. Delivery (banner, push
/// notification) is an external collaborator invoked with title/body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    RingCompleted { key: String, title: String },
    SpeedStreak { delta: f64 },
    KeystrokeMilestone { milestone: u64 },
}

impl NotificationEvent {
    pub fn title(&self) -> &'static str {
        match self {
            NotificationEvent::RingCompleted { .. } => "Ring completed",
            NotificationEvent::SpeedStreak { .. } => "Speed streak",
            NotificationEvent::KeystrokeMilestone { .. } => "Keystroke milestone",
        }
    }

    pub fn body(&self) -> String {
        match self {
            NotificationEvent::RingCompleted { title, .. } => {
                format!("{title} hit its target.")
            }
            NotificationEvent::SpeedStreak { delta } => {
                format!("Speed points jumped by {delta:.0}.")
            }
            NotificationEvent::KeystrokeMilestone { milestone } => {
                format!("{milestone} keystrokes logged.")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotifierConfig {
    pub streaks_enabled: bool,
    pub streak_delta: f64,
    pub milestone_interval: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            streaks_enabled: true,
            streak_delta: 5.0,
            milestone_interval: 100,
        }
    }
}

/// Holds one-time ring-completion state and the periodic milestone
/// watermark. All state is in-memory for the process lifetime: a ring
/// notifies at most once per run, even across mode toggles.
#[derive(Debug, Default)]
pub struct MilestoneNotifier {
    notified_rings: BTreeSet<String>,
    last_speed_progress: f64,
    last_keystroke_milestone: u64,
}

impl MilestoneNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates one cycle's ring readings against prior state.
    ///
    /// The speed watermark is updated every cycle whether or not a streak
    /// fires; the keystroke milestone watermark only moves forward.
    pub fn evaluate(
        &mut self,
        rings: &[(&RingDefinition, &RingValue)],
        speed_progress: f64,
        total_events: u64,
        config: &NotifierConfig,
    ) -> Vec<NotificationEvent> {
        let mut events = Vec::new();

        for (definition, value) in rings {
            if !definition.enabled || !value.complete() {
                continue;
            }
            if self.notified_rings.insert(definition.key.clone()) {
                events.push(NotificationEvent::RingCompleted {
                    key: definition.key.clone(),
                    title: definition.title.clone(),
                });
            }
        }

        let delta = speed_progress - self.last_speed_progress;
        if config.streaks_enabled && delta >= config.streak_delta {
            events.push(NotificationEvent::SpeedStreak { delta });
        }
        self.last_speed_progress = speed_progress;

        if config.milestone_interval > 0 {
            let milestone = total_events / config.milestone_interval * config.milestone_interval;
            if milestone > 0 && milestone > self.last_keystroke_milestone {
                events.push(NotificationEvent::KeystrokeMilestone { milestone });
                self.last_keystroke_milestone = milestone;
            }
        }

        events
    }
}
