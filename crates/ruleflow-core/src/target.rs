// crates/ruleflow-core/src/target.rs
// ============================================================================
// Module: Evaluation Targets
// Description: Type-erased handles to the domain objects a flow evaluates.
// Purpose: Let nodes filter and downcast targets without a type registry.
// Dependencies: crate::identifiers
// ============================================================================

//! ## Overview
//! A [`Target`] pairs a stable [`TargetId`] with the domain object it stands
//! for. Nodes declare the source type they operate on through a
//! [`TargetType`]; a node whose type does not match a target treats the
//! evaluation as vacuous instead of failing it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::any::TypeId;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::identifiers::TargetId;

// ============================================================================
// SECTION: Target
// ============================================================================

/// Shared, type-erased domain object behind a target.
pub type TargetSource = Arc<dyn Any + Send + Sync>;

/// Handle to a domain object under evaluation.
///
/// # Invariants
/// - Two targets are equal iff their identifiers are equal.
/// - Cloning shares the underlying source.
#[derive(Clone)]
pub struct Target {
    /// Stable identifier used for counter keys and result filtering.
    id: TargetId,
    /// Underlying domain object.
    source: TargetSource,
    /// Type name of the source, for diagnostics.
    type_name: &'static str,
}

impl Target {
    /// Wraps a domain object as a target.
    #[must_use]
    pub fn new<T>(id: impl Into<TargetId>, source: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self::from_arc(id, Arc::new(source))
    }

    /// Wraps an already shared domain object as a target.
    #[must_use]
    pub fn from_arc<T>(id: impl Into<TargetId>, source: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            id: id.into(),
            source,
            type_name: type_name::<T>(),
        }
    }

    /// Returns the stable target identifier.
    #[must_use]
    pub const fn unique_id(&self) -> &TargetId {
        &self.id
    }

    /// Returns the type-erased domain object.
    #[must_use]
    pub fn source(&self) -> &(dyn Any + Send + Sync) {
        self.source.as_ref()
    }

    /// Returns the domain object if it is of type `T`.
    #[must_use]
    pub fn source_as<T: Any>(&self) -> Option<&T> {
        self.source.downcast_ref::<T>()
    }

    /// Returns true when the domain object is of type `T`.
    #[must_use]
    pub fn is_target_type<T: Any>(&self) -> bool {
        self.source.is::<T>()
    }

    /// Returns the runtime type of the domain object.
    #[must_use]
    pub fn source_type_id(&self) -> TypeId {
        (*self.source).type_id()
    }

    /// Returns the type name of the domain object.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Target {}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target").field("id", &self.id).field("type", &self.type_name).finish()
    }
}

// ============================================================================
// SECTION: Target Type
// ============================================================================

/// Declared source type a node accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetType {
    /// Accepted source type; `None` accepts every target.
    type_id: Option<TypeId>,
    /// Type name for diagnostics.
    name: &'static str,
}

impl TargetType {
    /// Accepts targets whose source is of type `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            type_id: Some(TypeId::of::<T>()),
            name: type_name::<T>(),
        }
    }

    /// Accepts every target.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            type_id: None,
            name: "*",
        }
    }

    /// Returns true when the target's source is accepted.
    #[must_use]
    pub fn matches(&self, target: &Target) -> bool {
        self.type_id.is_none_or(|expected| expected == target.source_type_id())
    }

    /// Returns the accepted type name, or `*` for any.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for TargetType {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
