// ============================================================
// Layer 3 - Cost-of-Ownership Projector
// ============================================================
// Deterministic arithmetic turning a record plus a risk score
// into near-term cost estimates:
//
//   maintenance  = (last year's maintenance + base(action))
//                  * (1 + 0.35 * risk)
//   fuel         = annual miles / mpg * fuel price
//   depreciation = max(500, 12% of last year's total cost)
//   total        = sum of the three rounded parts
//
// All constants live in CostAssumptions so tests and callers
// can inject alternate tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::prediction::CostProjection;

/// Base maintenance cost per maintenance action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostTable {
    costs: BTreeMap<String, f64>,
    fallback: f64,
}

impl CostTable {
    pub fn new(costs: impl IntoIterator<Item = (String, f64)>, fallback: f64) -> Self {
        Self { costs: costs.into_iter().collect(), fallback }
    }

    /// Cost for `action`, or the fallback for unrecognised actions.
    pub fn base_cost(&self, action: &str) -> f64 {
        self.costs.get(action).copied().unwrap_or(self.fallback)
    }
}

impl Default for CostTable {
    fn default() -> Self {
        Self::new(
            [
                ("oil change", 120.0),
                ("brake pad replacement", 380.0),
                ("software update", 160.0),
                ("battery inspection", 90.0),
                ("tire rotation", 75.0),
            ]
            .map(|(a, c)| (a.to_string(), c)),
            150.0,
        )
    }
}

/// Fixed economic assumptions behind the projection.
/// Fields left out of a JSON file keep their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostAssumptions {
    pub cost_table: CostTable,
    pub annual_mileage: f64,
    pub fuel_price_per_gallon: f64,
    pub efficiency_mpg: f64,
    pub risk_weight: f64,
    pub depreciation_rate: f64,
    pub depreciation_floor: f64,
    // Fallbacks used when an input is not a finite number
    pub default_maintenance_cost: f64,
    pub default_total_cost: f64,
    pub default_risk_score: f64,
}

impl Default for CostAssumptions {
    fn default() -> Self {
        Self {
            cost_table: CostTable::default(),
            annual_mileage: 12_000.0,
            fuel_price_per_gallon: 3.5,
            efficiency_mpg: 26.0,
            risk_weight: 0.35,
            depreciation_rate: 0.12,
            depreciation_floor: 500.0,
            default_maintenance_cost: 600.0,
            default_total_cost: 1_500.0,
            default_risk_score: 0.2,
        }
    }
}

/// Inputs the projector reads from an engineered record.
#[derive(Debug, Clone, Copy)]
pub struct CostInputs<'a> {
    pub maintenance_action: &'a str,
    pub maintenance_cost_last_year: f64,
    pub total_cost_last_year: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CostProjector {
    assumptions: CostAssumptions,
}

impl CostProjector {
    pub fn new(assumptions: CostAssumptions) -> Self {
        Self { assumptions }
    }

    pub fn project(&self, inputs: CostInputs<'_>, risk_score: f64) -> CostProjection {
        let a = &self.assumptions;
        let maintenance_last = finite_or(inputs.maintenance_cost_last_year, a.default_maintenance_cost);
        let total_last = finite_or(inputs.total_cost_last_year, a.default_total_cost);
        let risk = finite_or(risk_score, a.default_risk_score);

        let base = a.cost_table.base_cost(inputs.maintenance_action);
        let risk_multiplier = 1.0 + a.risk_weight * risk;
        let maintenance = round_cents((maintenance_last + base) * risk_multiplier);

        let fuel = round_cents(a.annual_mileage / a.efficiency_mpg * a.fuel_price_per_gallon);

        let depreciation = round_cents(a.depreciation_floor.max(a.depreciation_rate * total_last));

        CostProjection {
            maintenance_projection: maintenance,
            fuel_cost_projection: fuel,
            depreciation_estimate: depreciation,
            total_projection: round_cents(maintenance + fuel + depreciation),
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
