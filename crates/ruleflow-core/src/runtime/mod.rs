// crates/ruleflow-core/src/runtime/mod.rs
// ============================================================================
// Module: Ruleflow Runtime Helpers
// Description: Ready-made collaborator implementations.
// Purpose: Provide in-memory storage, wall-clock time and a tokio scheduler.
// Dependencies: crate::interfaces, tokio
// ============================================================================

//! ## Overview
//! Hosts usually bring their own persistent [`Storage`](crate::Storage).
//! These implementations cover tests, demos and single-process embedding.

pub mod clock;
pub mod scheduler;
pub mod storage;

pub use clock::SystemClock;
pub use scheduler::TokioScheduler;
pub use storage::MemoryStorage;
