//! Resource Abstraction
//!
//! A resource is one configured driver instance within an object. This module
//! defines the capability set every driver exposes to the orchestrator:
//! identity, lifecycle actions, capability flags, status log and manifest.
//!
//! Submodules:
//! - [`log`]: per-resource leveled status log
//! - [`list`]: total ordering and RID set algebra over resource collections
//! - [`set`]: serial/parallel grouped execution with fault tolerance
//! - [`deps`]: action dependency edge store
//! - [`provision`]: leader-based provisioning state machine

pub mod deps;
pub mod list;
pub mod log;
pub mod provision;
pub mod set;

pub use deps::*;
pub use list::*;
pub use log::*;
pub use provision::*;
pub use set::*;

use crate::driver::{DriverGroup, Manifest, ResourceConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

// =============================================================================
// Resource ID
// =============================================================================

/// Resource identifier within an object (e.g. `app#1`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rid {
    pub group: DriverGroup,
    pub name: String,
}

impl Rid {
    pub fn new(group: DriverGroup, name: impl Into<String>) -> Self {
        Self {
            group,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Rid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.group)
        } else {
            write!(f, "{}#{}", self.group, self.name)
        }
    }
}

impl FromStr for Rid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (group, name) = match s.split_once('#') {
            Some((group, name)) => (group, name),
            None => (s, ""),
        };
        let group = group.parse::<DriverGroup>().map_err(|_| Error::InvalidResourceId {
            rid: s.to_string(),
        })?;
        Ok(Self::new(group, name))
    }
}

impl TryFrom<String> for Rid {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Rid> for String {
    fn from(rid: Rid) -> Self {
        rid.to_string()
    }
}

// =============================================================================
// Resource Core
// =============================================================================

/// Attributes shared by every driver instance
///
/// Drivers embed one of these and hand it back through [`Resource::core`];
/// the orchestrator never needs driver-specific state.
#[derive(Debug)]
pub struct ResourceCore {
    pub rid: Rid,
    pub subset: Option<String>,
    pub disable: bool,
    pub optional: bool,
    pub standby: bool,
    pub shared: bool,
    pub monitored: bool,
    pub encap: bool,
    pub object_path: String,
    pub nodes: Vec<String>,
    /// Owning object's var directory
    pub var_dir: PathBuf,
    pub log: StatusLog,
}

impl ResourceCore {
    pub fn from_config(config: ResourceConfig) -> Self {
        Self {
            rid: config.rid,
            subset: config.subset,
            disable: config.disable,
            optional: config.optional,
            standby: config.standby,
            shared: config.shared,
            monitored: config.monitored,
            encap: config.encap,
            object_path: config.object_path,
            nodes: config.nodes,
            var_dir: config.var_dir,
            log: StatusLog::new(),
        }
    }
}

// =============================================================================
// Resource Trait
// =============================================================================

/// Capability set every driver instance exposes to the orchestrator
///
/// The leader/leaded provisioning hooks are optional capabilities: the
/// default implementations are silent no-op successes, so most drivers
/// implement only the leader path and shared-resource drivers implement
/// both.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Shared attributes of this instance
    fn core(&self) -> &ResourceCore;

    /// The driver's configuration declaration
    fn manifest(&self) -> Manifest;

    /// Bring the resource up
    async fn start(&self) -> Result<()>;

    /// Bring the resource down
    async fn stop(&self) -> Result<()>;

    /// Driver-reported provisioning state probe
    async fn provisioned(&self) -> Result<ProvisionState>;

    /// Provision on the node holding the leader role
    async fn provision_leader(&self) -> Result<()> {
        Ok(())
    }

    /// Provision on a node following the leader
    async fn provision_leaded(&self) -> Result<()> {
        Ok(())
    }

    /// Unprovision on the node holding the leader role
    async fn unprovision_leader(&self) -> Result<()> {
        Ok(())
    }

    /// Unprovision on a node following the leader
    async fn unprovision_leaded(&self) -> Result<()> {
        Ok(())
    }

    /// Action dependency edges this driver declares
    fn action_dependencies(&self) -> Vec<Dep> {
        Vec::new()
    }

    // -------------------------------------------------------------------------
    // Provided accessors
    // -------------------------------------------------------------------------

    fn rid(&self) -> &Rid {
        &self.core().rid
    }

    fn driver_group(&self) -> DriverGroup {
        self.core().rid.group
    }

    /// Subset name; empty when the resource is in the group's default set
    fn subset(&self) -> &str {
        self.core().subset.as_deref().unwrap_or("")
    }

    fn log(&self) -> &StatusLog {
        &self.core().log
    }

    fn is_optional(&self) -> bool {
        self.core().optional
    }

    fn is_standby(&self) -> bool {
        self.core().standby
    }

    fn is_shared(&self) -> bool {
        self.core().shared
    }

    fn is_disabled(&self) -> bool {
        self.core().disable
    }

    fn is_monitored(&self) -> bool {
        self.core().monitored
    }

    fn is_encap(&self) -> bool {
        self.core().encap
    }

    /// Per-resource working directory under the object var directory
    fn var_dir(&self) -> PathBuf {
        self.core().var_dir.join(self.core().rid.to_string())
    }
}

pub type ResourceRef = Arc<dyn Resource>;

// =============================================================================
// Test Doubles
// =============================================================================
