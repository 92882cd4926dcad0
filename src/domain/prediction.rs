// ============================================================
// Layer 3 - Prediction Domain Types
// ============================================================
// Everything the inference engine hands back to a caller.
// A PredictionResult is built fresh for every call and is
// never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Probability at or above which a vehicle is High risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.65;

/// Probability at or above which a vehicle is Moderate risk.
pub const MODERATE_RISK_THRESHOLD: f64 = 0.40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    /// Fixed, boundary-inclusive thresholds; never learned.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            RiskBand::High
        } else if probability >= MODERATE_RISK_THRESHOLD {
            RiskBand::Moderate
        } else {
            RiskBand::Low
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskBand::Low => "Low",
            RiskBand::Moderate => "Moderate",
            RiskBand::High => "High",
        };
        f.write_str(s)
    }
}

/// Near-term monetary estimates, all rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostProjection {
    pub maintenance_projection: f64,
    pub fuel_cost_projection: f64,
    pub depreciation_estimate: f64,
    pub total_projection: f64,
}

/// When a milestone is due, measured from today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    Days(u32),
    Months(u32),
}

impl Timeframe {
    /// Approximate length in days, used only for ordering.
    pub fn approx_days(&self) -> u32 {
        match *self {
            Timeframe::Days(d) => d,
            Timeframe::Months(m) => m * 30,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Days(d) => write!(f, "Next {d} days"),
            Timeframe::Months(m) => write!(f, "{m} months"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub timeframe: Timeframe,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability of a mechanical issue, in [0, 1]
    pub probability: f64,
    pub risk_band: RiskBand,
    pub cost_projection: CostProjection,
    /// Nearest milestone first
    pub maintenance_timeline: Vec<Milestone>,
}

/// Two independent predictions side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub car_a: PredictionResult,
    pub car_b: PredictionResult,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_scenario_probabilities() {
        assert_eq!(RiskBand::from_probability(0.3), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(0.4), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(0.65), RiskBand::High);
        assert_eq!(RiskBand::from_probability(0.9), RiskBand::High);
    }

    #[test]
    fn test_band_boundaries_and_neighbours() {
        let below = |x: f64| x - f64::EPSILON;
        let above = |x: f64| x + f64::EPSILON;

        assert_eq!(RiskBand::from_probability(below(0.65)), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(above(0.65)), RiskBand::High);
        assert_eq!(RiskBand::from_probability(below(0.40)), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(above(0.40)), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(0.0), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(1.0), RiskBand::High);
    }

    #[test]
    fn test_timeframe_display() {
        assert_eq!(Timeframe::Days(30).to_string(), "Next 30 days");
        assert_eq!(Timeframe::Months(6).to_string(), "6 months");
        assert!(Timeframe::Days(30).approx_days() < Timeframe::Months(3).approx_days());
    }
}
