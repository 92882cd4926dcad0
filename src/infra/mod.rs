// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong in any specific
// business layer:
//
//   checkpoint.rs  - The trained-pipeline artifact directory.
//                    Writes the fitted transform as JSON and the
//                    classifier through Burn's DefaultRecorder,
//                    then a versioned manifest tying them
//                    together. Loading verifies all three agree.
//
//   metrics.rs     - Training reports. Appends per-epoch loss
//                    to a CSV file and writes the holdout
//                    evaluation as a JSON mapping.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Versioned artifact save and load
pub mod checkpoint;

/// Loss log and evaluation report
pub mod metrics;
