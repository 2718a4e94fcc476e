// crates/ruleflow-core/tests/support/fixtures.rs
// ============================================================================
// Module: Test Fixtures
// Description: Deterministic collaborators and leaf behaviors for node tests.
// ============================================================================
//! ## Overview
//! Provides a manual clock and scheduler, recording leaves and a configurable
//! veto so node policies can be exercised without wall-clock time.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use ruleflow_core::Action;
use ruleflow_core::ActionConfig;
use ruleflow_core::ActionNode;
use ruleflow_core::BehaviorError;
use ruleflow_core::BehaviorResult;
use ruleflow_core::Clock;
use ruleflow_core::EvalResult;
use ruleflow_core::ExecutionContext;
use ruleflow_core::ExecutionVeto;
use ruleflow_core::FlowNode;
use ruleflow_core::NodeId;
use ruleflow_core::Requirement;
use ruleflow_core::RequirementConfig;
use ruleflow_core::RequirementNode;
use ruleflow_core::Scheduler;
use ruleflow_core::SchedulerError;
use ruleflow_core::Scope;
use ruleflow_core::Target;
use ruleflow_core::Task;
use ruleflow_core::TriggerConfig;
use ruleflow_core::TriggerNode;
use ruleflow_core::VetoEvent;

// ========================================================================
// Target Sources
// ========================================================================

/// Player source used as the primary target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Display name.
    pub name: String,
    /// Current health.
    pub health: i32,
}

/// Monster source used to exercise target type filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monster {
    /// Species name.
    pub species: String,
}

/// Builds a player target whose id equals its name.
pub fn player(name: &str, health: i32) -> Target {
    Target::new(
        name,
        Player {
            name: name.to_string(),
            health,
        },
    )
}

/// Builds a monster target whose id equals its species.
pub fn monster(species: &str) -> Target {
    Target::new(
        species,
        Monster {
            species: species.to_string(),
        },
    )
}

// ========================================================================
// Collaborators
// ========================================================================

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    /// Current epoch milliseconds.
    now: AtomicI64,
}

impl ManualClock {
    /// Creates a clock at `start` milliseconds.
    pub fn at(start: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(start),
        })
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let millis = i64::try_from(by.as_millis()).unwrap();
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Scheduler that queues tasks until explicitly run.
#[derive(Default)]
pub struct ManualScheduler {
    /// Queued tasks with their requested delay.
    tasks: Mutex<Vec<(Duration, Task)>>,
}

impl ManualScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns the delays of the queued tasks.
    pub fn pending_delays(&self) -> Vec<Duration> {
        self.tasks.lock().unwrap().iter().map(|(delay, _)| *delay).collect()
    }

    /// Runs every queued task, including tasks queued while running.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        loop {
            let batch: Vec<(Duration, Task)> = std::mem::take(&mut *self.tasks.lock().unwrap());
            if batch.is_empty() {
                return ran;
            }
            for (_, task) in batch {
                task();
                ran += 1;
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn run_later(&self, task: Task, delay: Duration) -> Result<(), SchedulerError> {
        self.tasks.lock().unwrap().push((delay, task));
        Ok(())
    }
}

/// Scheduler that refuses every task.
pub struct RejectingScheduler;

impl Scheduler for RejectingScheduler {
    fn run_later(&self, _task: Task, _delay: Duration) -> Result<(), SchedulerError> {
        Err(SchedulerError::Rejected("scheduler is shut down".to_string()))
    }
}

/// Veto that cancels a fixed kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VetoKind {
    /// Cancel before gates.
    PreAction,
    /// Cancel before the action leaf.
    Action,
    /// Cancel a whole trigger batch.
    Trigger,
}

impl ExecutionVeto for VetoKind {
    fn veto(&self, event: &VetoEvent<'_>) -> bool {
        matches!(
            (self, event),
            (Self::PreAction, VetoEvent::PreActionExecution { .. })
                | (Self::Action, VetoEvent::ActionExecution { .. })
                | (Self::Trigger, VetoEvent::TriggerExecution { .. })
        )
    }
}

/// Veto that cancels every event concerning one node.
#[derive(Debug, Clone)]
pub struct VetoNode(pub NodeId);

impl ExecutionVeto for VetoNode {
    fn veto(&self, event: &VetoEvent<'_>) -> bool {
        event.node() == &self.0
    }
}

/// Scope over memory storage driven by a manual clock.
pub fn scope_at(clock: &Arc<ManualClock>) -> Scope {
    Scope::in_memory().with_clock(Arc::clone(clock) as Arc<dyn Clock>)
}

// ========================================================================
// Leaf Behaviors
// ========================================================================

/// Outcome a fixture leaf produces.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Return this result.
    Result(EvalResult),
    /// Return a behavior error.
    Fail(String),
    /// Panic with this message.
    Panic(String),
}

impl Outcome {
    /// Produces the configured outcome.
    fn produce(&self) -> BehaviorResult {
        match self {
            Self::Result(result) => Ok(result.clone()),
            Self::Fail(message) => Err(BehaviorError::new(message.clone())),
            Self::Panic(message) => panic!("{message}"),
        }
    }
}

/// Player action that records the names it ran for.
#[derive(Clone)]
pub struct RecordingAction {
    /// Label pushed to the log on each call.
    label: String,
    /// Shared call log.
    log: Arc<Mutex<Vec<String>>>,
    /// Result of each call.
    outcome: Outcome,
}

impl RecordingAction {
    /// Creates an action that logs `label:player` and succeeds.
    pub fn new(label: &str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self::with_outcome(label, log, Outcome::Result(EvalResult::success()))
    }

    /// Creates an action with a fixed outcome.
    pub fn with_outcome(label: &str, log: &Arc<Mutex<Vec<String>>>, outcome: Outcome) -> Self {
        Self {
            label: label.to_string(),
            log: Arc::clone(log),
            outcome,
        }
    }
}

impl Action<Player> for RecordingAction {
    fn execute(&self, target: &Player, _ctx: &ExecutionContext) -> BehaviorResult {
        self.log.lock().unwrap().push(format!("{}:{}", self.label, target.name));
        self.outcome.produce()
    }
}

/// Requirement that passes while the player's health is at least `min`.
#[derive(Clone)]
pub struct MinHealth {
    /// Threshold.
    pub min: i32,
    /// Number of leaf calls.
    pub calls: Arc<AtomicUsize>,
}

impl MinHealth {
    /// Creates the requirement with a fresh call counter.
    pub fn new(min: i32) -> Self {
        Self {
            min,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the number of leaf calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Requirement<Player> for MinHealth {
    fn test(&self, target: &Player, _ctx: &ExecutionContext) -> BehaviorResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = EvalResult::of_bool(target.health >= self.min);
        if result.is_success() {
            Ok(result)
        } else {
            Ok(result.with_message(format!("{} needs at least {} health", target.name, self.min)))
        }
    }
}

/// Requirement that always yields the same outcome.
#[derive(Clone)]
pub struct Fixed(pub Outcome);

impl Requirement<Player> for Fixed {
    fn test(&self, _target: &Player, _ctx: &ExecutionContext) -> BehaviorResult {
        self.0.produce()
    }
}

// ========================================================================
// Node Builders
// ========================================================================

/// Creates a new shared call log.
pub fn call_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Returns a snapshot of a call log.
pub fn entries(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Builds a named, always-successful player action.
pub fn action_named(name: &str, log: &Arc<Mutex<Vec<String>>>) -> ActionNode {
    ActionNode::new::<Player, _>(
        RecordingAction::new(name, log),
        ActionConfig {
            identifier: Some(name.to_string()),
            ..ActionConfig::default()
        },
    )
}

/// Builds a named requirement with a fixed outcome.
pub fn requirement_named(name: &str, outcome: Outcome) -> RequirementNode {
    RequirementNode::new::<Player, _>(
        Fixed(outcome),
        RequirementConfig {
            identifier: Some(name.to_string()),
            ..RequirementConfig::default()
        },
    )
}

/// Builds a named trigger listening for its own name.
pub fn trigger_named(name: &str) -> TriggerNode {
    TriggerNode::new(
        name,
        TriggerConfig {
            identifier: Some(name.to_string()),
            ..TriggerConfig::default()
        },
    )
}

/// Sorter input: requirement named `name`.
pub fn req(name: &str) -> FlowNode {
    requirement_named(name, Outcome::Result(EvalResult::success())).into()
}

/// Sorter input: action named `name`.
pub fn act(name: &str) -> FlowNode {
    action_named(name, &call_log()).into()
}

/// Sorter input: trigger named `name`.
pub fn trig(name: &str) -> FlowNode {
    trigger_named(name).into()
}

/// Renders a node tree compactly for structural assertions.
///
/// Actions render as `name[reqs](children)`, triggers as
/// `name[reqs]{actions}`, requirements as their name.
pub fn shape(node: &FlowNode) -> String {
    match node {
        FlowNode::Requirement(requirement) => requirement.id().to_string(),
        FlowNode::Action(action) => render_action(action),
        FlowNode::Trigger(trigger) => {
            let actions: Vec<String> = trigger.actions().iter().map(render_action).collect();
            format!("{}[{}]{{{}}}", trigger.id(), names(trigger.requirements()), actions.join(","))
        }
    }
}

/// Renders every root.
pub fn shapes(nodes: &[FlowNode]) -> Vec<String> {
    nodes.iter().map(shape).collect()
}

/// Renders an action subtree.
fn render_action(action: &ActionNode) -> String {
    let children: Vec<String> = action.actions().iter().map(render_action).collect();
    format!("{}[{}]({})", action.id(), names(action.requirements()), children.join(","))
}

/// Joins requirement names.
fn names(requirements: &[RequirementNode]) -> String {
    requirements.iter().map(|requirement| requirement.id().to_string()).collect::<Vec<_>>().join(",")
}
