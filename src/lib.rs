//! stackd - network-accessible stack store
//!
//! This library serves independent LIFO stack instances over a plaintext,
//! newline-delimited request/response protocol. Clients `CREATE` a stack and
//! receive an opaque, securely generated identifier; possession of that
//! identifier is the sole credential for pushing, popping, peeking, sizing,
//! and deleting the stack.
//!
//! # Core Concepts
//!
//! - **Stack Instance**: a bounded LIFO of opaque string values, serialized
//!   by its own lock so operations on one stack never block another
//! - **Stack Registry**: the authoritative identifier -> instance mapping,
//!   backed by a sharded concurrent map, with create/resolve/delete and
//!   idle expiry
//! - **Protocol**: request lines decode once at the boundary into typed
//!   commands; responses render back to single-line plain text
//!
//! # Example Usage
//!
//! ```
//! use stackd::store::StackRegistry;
//!
//! let registry = StackRegistry::new(1000, 102_400, None);
//!
//! let id = registry.create().expect("registry has capacity");
//! let stack = registry.resolve(&id).expect("id was just issued");
//!
//! stack.push("hello".to_string()).unwrap();
//! stack.push("world".to_string()).unwrap();
//!
//! assert_eq!(stack.pop().unwrap(), "world");
//! assert_eq!(stack.pop().unwrap(), "hello");
//! ```
//!
//! # Project Structure
//!
//! - [`store`]: identifiers, stack instances, and the registry (the core)
//! - [`protocol`]: wire command decoding and response rendering
//! - [`server`]: tokio TCP line server
//! - [`cli`]: clap command-line interface
//! - [`config`]: environment-driven configuration
//! - [`util`]: logging setup

// Public modules
pub mod cli;
pub mod config;
pub mod protocol;
pub mod server;
pub mod store;
pub mod util;

// Re-export key types for convenient access
pub use config::{ConfigError, StackdConfig};
pub use protocol::{Command, ParseError, Response};
pub use server::{execute, respond, StackServer};
pub use store::{RegistryStats, StackId, StackInstance, StackRegistry, StoreError};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_stackd() {
        assert_eq!(NAME, "stackd");
    }
}
