// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several layers:
//
//   checkpoint.rs      - model weights (Burn CompactRecorder) plus
//                        the JSON artifacts evaluation needs:
//                        run config, model config, label classes
//
//   tokenizer_store.rs - loads the pretrained tokenizer.json, or
//                        builds a word-level one when none exists
//
//   metrics.rs         - per-epoch CSV log and the per-class
//                        classification report
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Tokenizer loading and fallback building
pub mod tokenizer_store;

/// Training metrics CSV logger and classification report
pub mod metrics;
