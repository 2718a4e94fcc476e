// crates/ruleflow-core/src/context.rs
// ============================================================================
// Module: Execution Context
// Description: Collaborator scope and per-chain evaluation context.
// Purpose: Thread targets, scratch data and history through nested evaluation.
// Dependencies: crate::interfaces, crate::runtime, crate::target, serde_json
// ============================================================================

//! ## Overview
//! [`Scope`] bundles the collaborators a flow evaluates with (storage,
//! optional scheduler, clock, optional veto). It is passed explicitly; there
//! is no process-wide current scope.
//!
//! [`ExecutionContext`] is a cheap view onto one evaluation chain. Every view
//! derived with [`ExecutionContext::next`] shares the chain's scratch map,
//! history stack and target list by handle, so sibling views observe each
//! other's writes. A chain is meant for one logical thread of control.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::identifiers::NodeId;
use crate::interfaces::Clock;
use crate::interfaces::ExecutionVeto;
use crate::interfaces::Scheduler;
use crate::interfaces::Storage;
use crate::interfaces::StorageError;
use crate::interfaces::VetoEvent;
use crate::runtime::MemoryStorage;
use crate::runtime::SystemClock;
use crate::target::Target;

// ============================================================================
// SECTION: Storage Keys
// ============================================================================

/// Separator between storage key segments.
pub const KEY_SEPARATOR: char = '#';

/// Builds the storage key `node#target#key`.
#[must_use]
pub fn storage_key(node: &NodeId, target: &Target, key: &str) -> String {
    format!("{node}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{key}", target.unique_id())
}

// ============================================================================
// SECTION: Scope
// ============================================================================

/// Collaborators shared by every evaluation of a flow.
#[derive(Clone)]
pub struct Scope {
    /// Counter storage.
    storage: Arc<dyn Storage>,
    /// Optional scheduler for delayed bodies.
    scheduler: Option<Arc<dyn Scheduler>>,
    /// Source of "now".
    clock: Arc<dyn Clock>,
    /// Optional external veto.
    veto: Option<Arc<dyn ExecutionVeto>>,
}

impl Scope {
    /// Creates a scope over `storage` with the system clock and no scheduler.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            scheduler: None,
            clock: Arc::new(SystemClock),
            veto: None,
        }
    }

    /// Creates a scope over a fresh [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Returns the scope with a scheduler for delayed bodies.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Returns the scope with a different clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the scope with an execution veto.
    #[must_use]
    pub fn with_veto(mut self, veto: Arc<dyn ExecutionVeto>) -> Self {
        self.veto = Some(veto);
        self
    }

    /// Returns the counter storage.
    #[must_use]
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Returns the scheduler, if configured.
    #[must_use]
    pub fn scheduler(&self) -> Option<&Arc<dyn Scheduler>> {
        self.scheduler.as_ref()
    }

    /// Returns the current time in epoch milliseconds.
    #[must_use]
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Returns true when the veto cancels `event`.
    #[must_use]
    pub fn is_vetoed(&self, event: &VetoEvent<'_>) -> bool {
        self.veto.as_ref().is_some_and(|veto| veto.veto(event))
    }

    /// Stores `value` under `node#target#key`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when encoding or the backend fails.
    pub fn store<V: Serialize>(
        &self,
        node: &NodeId,
        target: &Target,
        key: &str,
        value: &V,
    ) -> Result<Option<Value>, StorageError> {
        let key = storage_key(node, target, key);
        let value = serde_json::to_value(value).map_err(|err| StorageError::Encode {
            key: key.clone(),
            message: err.to_string(),
        })?;
        self.storage.set(&key, value)
    }

    /// Loads the value under `node#target#key` as `T`.
    ///
    /// A stored value of a different shape reads as absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    pub fn load<T: DeserializeOwned>(
        &self,
        node: &NodeId,
        target: &Target,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        let key = storage_key(node, target, key);
        let Some(value) = self.storage.get(&key)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "stored value has unexpected shape");
                Ok(None)
            }
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("scheduler", &self.scheduler.is_some())
            .field("veto", &self.veto.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Node References
// ============================================================================

/// Category of a flow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Boolean-ish check gating other nodes.
    Requirement,
    /// Side-effecting step, possibly with nested children.
    Action,
    /// Entry point fired by an external event.
    Trigger,
}

impl NodeKind {
    /// Returns the stable lowercase label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requirement => "requirement",
            Self::Action => "action",
            Self::Trigger => "trigger",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lightweight reference to a node within an evaluation chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    /// Node identifier.
    pub id: NodeId,
    /// Node category.
    pub kind: NodeKind,
}

impl NodeRef {
    /// Creates a node reference.
    #[must_use]
    pub const fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
        }
    }
}

// ============================================================================
// SECTION: Execution Context
// ============================================================================

/// State shared by every view of one evaluation chain.
#[derive(Debug, Default)]
struct ChainState {
    /// Scratch key/value data.
    data: BTreeMap<String, Value>,
    /// Previously current nodes, oldest first.
    history: Vec<NodeRef>,
    /// Targets of the chain.
    targets: Vec<Target>,
}

/// View onto an evaluation chain scoped to one current node.
///
/// # Invariants
/// - History only grows, and only through [`ExecutionContext::next`].
/// - All views derived from one root share data, history and targets.
#[derive(Clone)]
pub struct ExecutionContext {
    /// Collaborators.
    scope: Scope,
    /// Node that started the chain, if any.
    root: Option<NodeRef>,
    /// Node this view is scoped to.
    current: Option<NodeRef>,
    /// Shared chain state.
    chain: Arc<Mutex<ChainState>>,
}

impl ExecutionContext {
    /// Creates a root view: no current node, empty history, fresh scratch map.
    #[must_use]
    pub fn of(scope: Scope, root: Option<NodeRef>, targets: impl IntoIterator<Item = Target>) -> Self {
        Self {
            scope,
            root,
            current: None,
            chain: Arc::new(Mutex::new(ChainState {
                targets: targets.into_iter().collect(),
                ..ChainState::default()
            })),
        }
    }

    /// Locks the shared chain state, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.chain.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a view scoped to `node`, pushing the old current onto history.
    #[must_use]
    pub fn next(&self, node: impl Into<NodeRef>) -> Self {
        let node = node.into();
        if let Some(current) = &self.current {
            self.lock().history.push(current.clone());
        }
        tracing::trace!(node = %node.id, kind = %node.kind, "context advanced");
        Self {
            scope: self.scope.clone(),
            root: self.root.clone(),
            current: Some(node),
            chain: Arc::clone(&self.chain),
        }
    }

    /// Returns the collaborators.
    #[must_use]
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Returns the node that started the chain.
    #[must_use]
    pub const fn root(&self) -> Option<&NodeRef> {
        self.root.as_ref()
    }

    /// Returns the node this view is scoped to.
    #[must_use]
    pub const fn current(&self) -> Option<&NodeRef> {
        self.current.as_ref()
    }

    /// Returns the most recently pushed history entry.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef> {
        self.lock().history.last().cloned()
    }

    /// Returns a snapshot of the history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<NodeRef> {
        self.lock().history.clone()
    }

    /// Returns a snapshot of the chain's targets.
    #[must_use]
    pub fn targets(&self) -> Vec<Target> {
        self.lock().targets.clone()
    }

    /// Adds a target to the chain unless it is already present.
    pub fn add_target(&self, target: Target) {
        let mut chain = self.lock();
        if !chain.targets.contains(&target) {
            chain.targets.push(target);
        }
    }

    /// Returns the scratch value under `key`.
    #[must_use]
    pub fn data(&self, key: &str) -> Option<Value> {
        self.lock().data.get(key).cloned()
    }

    /// Sets the scratch value under `key`, returning the previous value.
    pub fn set_data(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.lock().data.insert(key.into(), value)
    }

    /// Stores `value` in the current node's counters for `target`.
    ///
    /// Returns `Ok(None)` without writing when no node is current.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when encoding or the backend fails.
    pub fn store<V: Serialize>(&self, target: &Target, key: &str, value: &V) -> Result<Option<Value>, StorageError> {
        match &self.current {
            Some(current) => self.scope.store(&current.id, target, key, value),
            None => Ok(None),
        }
    }

    /// Loads a value from the current node's counters for `target`.
    ///
    /// Returns `Ok(None)` when no node is current.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    pub fn load<T: DeserializeOwned>(&self, target: &Target, key: &str) -> Result<Option<T>, StorageError> {
        match &self.current {
            Some(current) => self.scope.load(&current.id, target, key),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("root", &self.root)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
