//! Service Orchestrator - Resource Action Engine
//!
//! A cluster-aware service orchestrator core: composite objects (services,
//! volumes, configs) are built from typed resources (filesystems, disks,
//! ips, containers, apps, sync jobs) spread across cluster nodes, and their
//! actions run in a safe, deterministic, fault-tolerant order.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Object Action Runner (external)             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌───────────────┐  ┌────────────────┐  ┌────────────────────┐  │
//! │  │    Driver     │  │    Resource    │  │  Action Dependency │  │
//! │  │   Registry    │  │    Ordering    │  │       Store        │  │
//! │  └───────┬───────┘  └───────┬────────┘  └─────────┬──────────┘  │
//! │          │                  │                     │             │
//! │          └──────────────────┼─────────────────────┘             │
//! │                             │                                   │
//! │                 ┌───────────┴────────────┐                      │
//! │                 │      Resource Sets     │                      │
//! │                 │   (serial / parallel)  │                      │
//! │                 └───────────┬────────────┘                      │
//! ├─────────────────────────────┼───────────────────────────────────┤
//! │                 ┌───────────┴────────────┐                      │
//! │                 │  Provisioning Machine  │                      │
//! │                 │    (leader / leaded)   │                      │
//! │                 └────────────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`driver`]: driver identity, manifests and the allocator registry
//! - [`resource`]: the resource abstraction, ordering, sets, dependencies
//!   and the provisioning state machine
//! - [`drivers`]: built-in reference drivers
//! - [`error`]: error types and handling

pub mod driver;
pub mod drivers;
pub mod error;
pub mod resource;

// Re-export commonly used types
pub use driver::{
    AllocatorRef, ContextKind, ContextRef, DriverAllocator, DriverGroup, DriverId,
    DriverRegistry, Keyword, Manifest, ResourceConfig,
};

pub use resource::{
    ActionFamily, Dep, DepKind, DependencyStore, LogEntry, LogLevel, ProvisionState,
    ProvisionStatus, Resource, ResourceCore, ResourceList, ResourceRef, ResourceSet, Rid,
    StatusLog,
};

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
