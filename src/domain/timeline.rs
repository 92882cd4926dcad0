// ============================================================
// Layer 3 - Maintenance Timeline Synthesizer
// ============================================================
// Turns a risk score into a service schedule. The base service
// interval (6 months) is compressed by up to 40% as risk rises,
// never below 3 months. High-risk vehicles additionally get a
// specialist assessment within 30 days.
//
// Milestones come back nearest first.

use serde::{Deserialize, Serialize};

use crate::domain::prediction::{Milestone, Timeframe};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelinePolicy {
    pub base_interval_months: u32,
    pub min_interval_months: u32,
    pub max_compression: f64,
    /// Risk is clamped to [0, risk_ceiling] before compression
    pub risk_ceiling: f64,
    /// Risk strictly above this adds the specialist milestone
    pub specialist_threshold: f64,
    pub specialist_within_days: u32,
    pub default_risk_score: f64,
}

impl Default for TimelinePolicy {
    fn default() -> Self {
        Self {
            base_interval_months: 6,
            min_interval_months: 3,
            max_compression: 0.4,
            risk_ceiling: 0.95,
            specialist_threshold: 0.6,
            specialist_within_days: 30,
            default_risk_score: 0.25,
        }
    }
}

const ROUTINE_ACTIONS: [&str; 3] = [
    "Comprehensive inspection & fluid checks",
    "Predictive component diagnostics",
    "System software updates & alignment",
];

const SPECIALIST_ACTION: &str = "Schedule reliability assessment with specialist";

#[derive(Debug, Clone, Default)]
pub struct TimelineSynthesizer {
    policy: TimelinePolicy,
}

impl TimelineSynthesizer {
    pub fn new(policy: TimelinePolicy) -> Self {
        Self { policy }
    }

    /// Compressed service interval in whole months.
    pub fn interval_months(&self, risk_score: f64) -> u32 {
        let p = &self.policy;
        let risk = self.effective_risk(risk_score).clamp(0.0, p.risk_ceiling);
        let compression = 1.0 - risk * p.max_compression;
        let months = (p.base_interval_months as f64 * compression).floor() as u32;
        months.max(p.min_interval_months)
    }

    pub fn synthesize(&self, risk_score: f64) -> Vec<Milestone> {
        let interval = self.interval_months(risk_score);
        let mut milestones = Vec::with_capacity(ROUTINE_ACTIONS.len() + 1);

        if self.effective_risk(risk_score) > self.policy.specialist_threshold {
            milestones.push(Milestone {
                timeframe: Timeframe::Days(self.policy.specialist_within_days),
                action: SPECIALIST_ACTION.to_string(),
            });
        }

        for (step, action) in (1u32..).zip(ROUTINE_ACTIONS) {
            milestones.push(Milestone {
                timeframe: Timeframe::Months(interval * step),
                action: action.to_string(),
            });
        }

        milestones.sort_by_key(|m| m.timeframe.approx_days());
        milestones
    }

    fn effective_risk(&self, risk_score: f64) -> f64 {
        if risk_score.is_finite() {
            risk_score
        } else {
            self.policy.default_risk_score
        }
    }
}
