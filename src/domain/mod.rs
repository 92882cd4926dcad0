// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing vehicles,
// predictions and the deterministic business rules that sit
// on top of a risk score (cost projection, service timeline).
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust types and pure functions
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Typed error taxonomy shared by every layer
pub mod error;

// A raw vehicle row and its engineered view
pub mod vehicle;

// Immutable feature-group declaration
pub mod feature_config;

// Risk band, cost projection, timeline and prediction result
pub mod prediction;

// Cost-of-ownership projection
pub mod ownership;

// Maintenance schedule synthesis
pub mod timeline;

// Core abstractions (traits) that other layers implement
pub mod traits;
