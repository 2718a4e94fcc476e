// crates/ruleflow-core/src/result/mod.rs
// ============================================================================
// Module: Result Model
// Description: Composable outcome types for flow evaluation.
// Purpose: Group status, plain, combined and future results.
// Dependencies: crate::identifiers, crate::target
// ============================================================================

//! ## Overview
//! The result model has no dependencies on the runtime. Every node operation
//! reports through these types, and combination rules let failures and
//! errors contaminate an enclosing aggregation while keeping each child's
//! messages available for diagnosis.

pub mod combined;
pub mod future;
pub mod outcome;
pub mod status;

pub use combined::CombinedResult;
pub use future::CompletionCallback;
pub use future::FutureResult;
pub use outcome::EvalResult;
pub use outcome::ResultEntry;
pub use outcome::TargetResult;
pub use status::ResultStatus;
