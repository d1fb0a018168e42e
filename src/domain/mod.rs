// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types describing the labelled issue data.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// The label encoder lives here because every other layer
// (splitting, weighting, loss, evaluation) must agree on the
// same class-index order.

// Raw CSV rows and their labelled counterparts
pub mod issue;

// Bijective string label <-> class index mapping
pub mod label_encoder;

// Core abstractions (traits) that other layers implement
pub mod traits;
