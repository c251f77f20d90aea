//! The stack store: identifiers, instances, and the registry that owns them.
//!
//! This is the core of the service. A [`StackRegistry`] maps opaque,
//! securely generated [`StackId`]s to independent [`StackInstance`]s; each
//! instance is a bounded LIFO serialized by its own lock. Everything above
//! this module (protocol, server, CLI) is plumbing that translates wire text
//! into calls here and results back into wire text.

pub mod id;
pub mod registry;
pub mod stack;

pub use id::StackId;
pub use registry::{RegistryStats, StackRegistry};
pub use stack::StackInstance;

use thiserror::Error;

/// Failures the store surfaces to callers.
///
/// Every variant is recoverable by the caller and never fatal to the
/// service; one stack's failure does not affect any other stack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The identifier was never issued, was deleted, or has expired.
    #[error("unknown stack id: {0}")]
    UnknownId(StackId),

    /// Pop or peek on a stack with no elements (also bulk-pop underflow).
    #[error("stack is empty")]
    Empty,

    /// Push would exceed the per-stack depth bound.
    #[error("stack overflow (limit {limit})")]
    Overflow { limit: usize },

    /// Create would exceed the registry's instance bound.
    #[error("maximum number of stacks reached ({limit})")]
    RegistryFull { limit: usize },
}
