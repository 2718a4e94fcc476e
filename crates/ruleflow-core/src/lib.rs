// crates/ruleflow-core/src/lib.rs
// ============================================================================
// Module: Ruleflow Core Library
// Description: Rule-evaluation engine for requirement, action and trigger flows.
// Purpose: Expose the result model, execution context, node runtime and sorter.
// Dependencies: serde, serde_json, thiserror, tokio, tracing, uuid
// ============================================================================

//! ## Overview
//! Ruleflow turns a flat, ordered sequence of requirement, action and trigger
//! nodes into a nested tree, then evaluates that tree against runtime
//! targets. Evaluation produces composable results under per-node policy:
//! delay, cooldown, execute-once, check-once caching, negation and count
//! thresholds.
//!
//! - [`result`]: status algebra, combined and future results.
//! - [`context`]: collaborator [`Scope`] and per-chain [`ExecutionContext`].
//! - [`node`]: action, requirement and trigger nodes.
//! - [`flow`]: the flow sorter, the line-oriented parser contract and [`Flow`].
//!
//! Collaborators (storage, scheduler, clock, veto) are traits in
//! [`interfaces`]; [`runtime`] provides in-memory and tokio-backed defaults.

pub mod context;
pub mod error;
pub mod flow;
pub mod identifiers;
pub mod interfaces;
pub mod node;
pub mod result;
pub mod runtime;
pub mod target;
pub mod time;

pub use context::ExecutionContext;
pub use context::NodeKind;
pub use context::NodeRef;
pub use context::Scope;
pub use error::BehaviorError;
pub use error::RuntimeError;
pub use flow::Flow;
pub use flow::FlowParseError;
pub use flow::FlowParser;
pub use flow::FlowSorter;
pub use flow::LineError;
pub use flow::NodeFactory;
pub use flow::sort_flow;
pub use identifiers::NodeId;
pub use identifiers::TargetId;
pub use interfaces::Clock;
pub use interfaces::ExecutionVeto;
pub use interfaces::Scheduler;
pub use interfaces::SchedulerError;
pub use interfaces::Storage;
pub use interfaces::StorageError;
pub use interfaces::Task;
pub use interfaces::VetoEvent;
pub use node::Action;
pub use node::ActionConfig;
pub use node::ActionNode;
pub use node::BehaviorResult;
pub use node::FlowNode;
pub use node::Requirement;
pub use node::RequirementConfig;
pub use node::RequirementNode;
pub use node::Trigger;
pub use node::TriggerConfig;
pub use node::TriggerListener;
pub use node::TriggerNode;
pub use result::CombinedResult;
pub use result::EvalResult;
pub use result::FutureResult;
pub use result::ResultEntry;
pub use result::ResultStatus;
pub use result::TargetResult;
pub use runtime::MemoryStorage;
pub use runtime::SystemClock;
pub use runtime::TokioScheduler;
pub use target::Target;
pub use target::TargetType;
pub use time::TimeNotationError;
pub use time::format_duration;
pub use time::format_short;
pub use time::parse_duration;
