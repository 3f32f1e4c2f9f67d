//! Driver Registry
//!
//! Maps driver identities to allocators. The registry is populated once by an
//! explicit registration step at startup (see [`crate::drivers::register_builtin`])
//! and treated as read-only afterwards.
//!
//! Lookup falls back once to the group-default entry: a generic group driver
//! (e.g. a pool-backed volume) can satisfy lookups for names that were never
//! individually registered.

use super::{DriverGroup, DriverId, Manifest};
use crate::error::Result;
use crate::resource::{Resource, Rid};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// Resource Configuration
// =============================================================================

/// Values the configuration layer resolves for one resource instance
///
/// The config-key parsing layer is an external collaborator; it hands the
/// allocator this already-resolved view of a resource section.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    /// Resource id (e.g. `app#1`)
    pub rid: Rid,
    /// Subset grouping name, if any
    pub subset: Option<String>,
    /// Resource is configured but excluded from actions
    pub disable: bool,
    /// Action failures must not abort the containing resource set
    pub optional: bool,
    /// Kept present but not actively serving on non-primary nodes
    pub standby: bool,
    /// Shared across nodes; provisioning must not be duplicated
    pub shared: bool,
    /// Monitored by the daemon's resource monitor
    pub monitored: bool,
    /// Runs inside an encapsulated container
    pub encap: bool,
    /// Owning object path (e.g. `ns1/svc/web`)
    pub object_path: String,
    /// Owning object's node list
    pub nodes: Vec<String>,
    /// Owning object's topology
    pub topology: Option<String>,
    /// Owning object's var directory
    pub var_dir: PathBuf,
    /// Keyword values for this driver instance
    pub options: BTreeMap<String, String>,
}

impl ResourceConfig {
    pub fn new(rid: Rid, var_dir: impl Into<PathBuf>) -> Self {
        Self {
            rid,
            subset: None,
            disable: false,
            optional: false,
            standby: false,
            shared: false,
            monitored: false,
            encap: false,
            object_path: String::new(),
            nodes: Vec::new(),
            topology: None,
            var_dir: var_dir.into(),
            options: BTreeMap::new(),
        }
    }

    /// Keyword value for this instance, if set
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }
}

// =============================================================================
// Driver Allocator
// =============================================================================

/// Constructor for resource instances of one driver type
pub trait DriverAllocator: Send + Sync {
    /// The driver's declaration of consumed configuration
    fn manifest(&self) -> Manifest;

    /// Build a resource instance from resolved configuration
    fn allocate(&self, config: ResourceConfig) -> Result<Box<dyn Resource>>;
}

pub type AllocatorRef = Arc<dyn DriverAllocator>;

// =============================================================================
// Driver Registry
// =============================================================================

/// Registry of driver allocators keyed by identity
#[derive(Default)]
pub struct DriverRegistry {
    entries: HashMap<DriverId, AllocatorRef>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an allocator. Last write wins per exact key.
    pub fn register(&mut self, id: DriverId, allocator: AllocatorRef) {
        debug!("Registering driver: {}", id);
        self.entries.insert(id, allocator);
    }

    /// Exact lookup, then one group-default fallback
    ///
    /// Returns `None` when both lookups miss. A miss is not an error.
    pub fn get(&self, id: &DriverId) -> Option<AllocatorRef> {
        if let Some(allocator) = self.entries.get(id) {
            return Some(allocator.clone());
        }
        if id.is_generic() {
            return None;
        }
        self.entries.get(&id.generic_id()).cloned()
    }

    /// Exact lookup only, no fallback
    pub fn get_strict(&self, id: &DriverId) -> Option<AllocatorRef> {
        self.entries.get(id).cloned()
    }

    /// All registered identities, order unspecified
    pub fn list(&self) -> Vec<DriverId> {
        self.entries.keys().cloned().collect()
    }

    /// Registered names per group, sorted for stable output
    pub fn names_by_group(&self) -> BTreeMap<DriverGroup, Vec<String>> {
        let mut by_group: BTreeMap<DriverGroup, Vec<String>> = BTreeMap::new();
        for id in self.entries.keys() {
            by_group.entry(id.group).or_default().push(id.name.clone());
        }
        for names in by_group.values_mut() {
            names.sort();
        }
        by_group
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
