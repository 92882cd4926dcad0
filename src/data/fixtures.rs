// ============================================================
// Test fixtures - seeded synthetic vehicle records
// ============================================================
// Compiled only under cfg(test). The label is a noisy threshold
// on mileage, maintenance history and severity so a trained
// classifier has real signal to find.

use std::path::Path;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::domain::vehicle::VehicleRecord;

const MAKES_MODELS: [(&str, [&str; 3]); 5] = [
    ("Toyota", ["Camry", "Corolla", "RAV4"]),
    ("Honda", ["Civic", "Accord", "CR-V"]),
    ("Ford", ["F-150", "Escape", "Fusion"]),
    ("Tesla", ["Model 3", "Model S", "Model Y"]),
    ("Subaru", ["Outback", "Forester", "Impreza"]),
];

const ISSUES: [&str; 6] = [
    "transmission failure",
    "engine stalling",
    "battery degradation",
    "brake wear",
    "suspension noise",
    "infotainment crash",
];

const IMPACTS: [&str; 4] = [
    "sudden shutdown",
    "reduced acceleration",
    "dashboard malfunction",
    "warning chimes",
];

const ACTIONS: [&str; 5] = [
    "oil change",
    "brake pad replacement",
    "software update",
    "battery inspection",
    "tire rotation",
];

const POSITIVE: [&str; 3] = ["reliable", "smooth", "quiet"];
const NEGATIVE: [&str; 3] = ["frustrating", "unsafe", "expensive"];

/// One fixed, labelled record.
pub fn sample_record() -> VehicleRecord {
    VehicleRecord {
        make: "Toyota".into(),
        model: "Camry".into(),
        year: 2018,
        mileage: 60_000,
        avg_trip_length_miles: 18.0,
        maintenance_events: 2,
        past_failures: 1,
        severity_score: 3.5,
        maintenance_cost_last_year: 650.0,
        fuel_cost_last_year: 1200.0,
        complaint_text: "Owner reported brake wear leading to warning chimes. Owner felt frustrating."
            .into(),
        maintenance_action: "brake pad replacement".into(),
        has_mechanical_issue: Some(1),
    }
}

/// `n` labelled records, reproducible for a given seed.
pub fn synthetic_records(n: usize, seed: u64) -> Vec<VehicleRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| synthetic_record(&mut rng)).collect()
}

fn synthetic_record(rng: &mut StdRng) -> VehicleRecord {
    let (make, models) = MAKES_MODELS[rng.gen_range(0..MAKES_MODELS.len())];
    let model = models[rng.gen_range(0..models.len())];
    let year = rng.gen_range(2010..2023);
    let mileage: u32 = rng.gen_range(10_000..150_000);
    let maintenance_events: u32 = rng.gen_range(0..6);
    let past_failures: u32 = rng.gen_range(0..4);
    let severity_score = (rng.gen_range(0.0..10.0_f64) * 100.0).round() / 100.0;

    let risk = 0.3 * mileage as f64 / 100_000.0
        + 0.25 * maintenance_events as f64 / 5.0
        + 0.2 * past_failures as f64 / 3.0
        + 0.25 * severity_score / 10.0;
    let label = u8::from(risk + rng.gen_range(-0.05..0.05) > 0.55);

    let issue = ISSUES.choose(rng).copied().unwrap_or("brake wear");
    let impact = IMPACTS.choose(rng).copied().unwrap_or("warning chimes");
    let action = ACTIONS.choose(rng).copied().unwrap_or("oil change");
    let feeling = if label == 1 {
        NEGATIVE.choose(rng).copied().unwrap_or("unsafe")
    } else {
        POSITIVE.choose(rng).copied().unwrap_or("reliable")
    };

    VehicleRecord {
        make: make.to_string(),
        model: model.to_string(),
        year,
        mileage,
        avg_trip_length_miles: (rng.gen_range(5.0..60.0_f64) * 10.0).round() / 10.0,
        maintenance_events,
        past_failures,
        severity_score,
        maintenance_cost_last_year: (rng.gen_range(120.0..2400.0_f64) * 100.0).round() / 100.0,
        fuel_cost_last_year: (rng.gen_range(320.0..3600.0_f64) * 100.0).round() / 100.0,
        complaint_text: format!(
            "{year} {make} {model} experienced {issue} around {mileage} miles causing {impact}. \
             Owner felt {feeling} after {action}."
        ),
        maintenance_action: action.to_string(),
        has_mechanical_issue: Some(label),
    }
}

/// Write `records` as a headed CSV dataset.
pub fn write_csv(path: &Path, records: &[VehicleRecord]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    for record in records {
        writer.serialize(record).unwrap();
    }
    writer.flush().unwrap();
}
