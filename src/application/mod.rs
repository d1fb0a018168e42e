// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one command (train, inspect or evaluate).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No direct file access (that's Layer 4 and 6)
//   - Only workflow coordination, plus the console summaries
//     a user reads at the end of each stage
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Load → clean → split → weigh, shared by all commands
pub mod pipeline;

// The training workflow
pub mod train_use_case;

// Data statistics without training
pub mod inspect_use_case;

// Test-partition classification report from a checkpoint
pub mod evaluate_use_case;
