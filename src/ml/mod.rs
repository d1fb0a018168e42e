// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model, loss and training-loop code.
//
//   model.rs     - transformer encoder + classification head
//                  (token/position embeddings, masked multi-head
//                  self-attention, GELU feed-forward, layer norm,
//                  mean pooling over real tokens)
//
//   loss.rs      - class-weighted cross-entropy, independent of
//                  the training loop
//
//   trainer.rs   - AdamW loop with validation, checkpoint and
//                  metrics row per epoch
//
//   evaluator.rs - batch prediction for the held-out test set
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need

/// Transformer encoder classifier architecture
pub mod model;

/// Class-weighted cross-entropy
pub mod loss;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Batch prediction on tokenised samples
pub mod evaluator;
