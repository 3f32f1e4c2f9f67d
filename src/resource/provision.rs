//! Provisioning State Machine
//!
//! Leader/non-leader routing of provision and unprovision calls, plus the
//! provisioning status read-model. The leader boolean is computed by the
//! cluster leadership layer and supplied per call; this module only routes.
//!
//! The persisted change-time signal is a marker file at
//! `<object-var-dir>/<rid>/provisioned`: only its existence and mtime are
//! meaningful, content is irrelevant.

use super::Resource;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

// =============================================================================
// Provision State
// =============================================================================

/// Tri-state provisioning state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisionState {
    #[serde(rename = "true")]
    Provisioned,
    #[serde(rename = "false")]
    Unprovisioned,
    #[serde(rename = "n/a")]
    NotApplicable,
}

impl std::fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProvisionState::Provisioned => write!(f, "true"),
            ProvisionState::Unprovisioned => write!(f, "false"),
            ProvisionState::NotApplicable => write!(f, "n/a"),
        }
    }
}

impl From<bool> for ProvisionState {
    fn from(provisioned: bool) -> Self {
        if provisioned {
            ProvisionState::Provisioned
        } else {
            ProvisionState::Unprovisioned
        }
    }
}

/// Provisioning status read-model
///
/// Not a source of truth: the state comes from the driver's own probe and
/// the mtime from the cache marker file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionStatus {
    pub state: ProvisionState,
    pub mtime: Option<DateTime<Utc>>,
}

// =============================================================================
// Status
// =============================================================================

/// The provisioning cache marker file for a resource
pub fn cache_file(resource: &dyn Resource) -> PathBuf {
    resource.var_dir().join("provisioned")
}

/// Compute the provisioning status of a resource
///
/// A failing driver probe is logged to the resource's status log and
/// degrades the state to `n/a`; the mtime-derived timestamp is still
/// returned.
pub async fn status(resource: &dyn Resource) -> ProvisionStatus {
    let state = match resource.provisioned().await {
        Ok(state) => state,
        Err(err) => {
            warn!("Resource {} provisioned probe failed: {}", resource.rid(), err);
            resource
                .log()
                .error(format!("provisioned probe failed: {}", err));
            ProvisionState::NotApplicable
        }
    };
    ProvisionStatus {
        state,
        mtime: cache_mtime(resource).await,
    }
}

async fn cache_mtime(resource: &dyn Resource) -> Option<DateTime<Utc>> {
    match fs::metadata(cache_file(resource)).await {
        Ok(metadata) => metadata.modified().ok().map(DateTime::<Utc>::from),
        Err(_) => None,
    }
}

// =============================================================================
// Provision / Unprovision
// =============================================================================

/// Provision a resource
///
/// Routing: standby resources always take the leader path (they exist on
/// every node). Non-shared resources take the leader path too. Shared
/// resources take the leader path only on the leader node; everywhere else
/// the leaded path runs, so the authoritative action is never duplicated.
pub async fn provision(resource: &dyn Resource, leader: bool) -> Result<()> {
    if use_leaded_provision(resource, leader) {
        debug!("Resource {} provision: leaded path", resource.rid());
        resource.provision_leaded().await?;
    } else {
        debug!("Resource {} provision: leader path", resource.rid());
        resource.provision_leader().await?;
    }
    write_cache(resource).await
}

/// Unprovision a resource
///
/// Always stops the resource first: a resource that cannot stop must not
/// be unprovisioned, so a stop failure returns immediately without any
/// leader/leaded dispatch.
pub async fn unprovision(resource: &dyn Resource, leader: bool) -> Result<()> {
    resource.stop().await?;
    if use_leaded_unprovision(resource, leader) {
        debug!("Resource {} unprovision: leaded path", resource.rid());
        resource.unprovision_leaded().await?;
    } else {
        debug!("Resource {} unprovision: leader path", resource.rid());
        resource.unprovision_leader().await?;
    }
    clear_cache(resource).await
}

fn use_leaded_provision(resource: &dyn Resource, leader: bool) -> bool {
    !resource.is_standby() && resource.is_shared() && !leader
}

fn use_leaded_unprovision(resource: &dyn Resource, leader: bool) -> bool {
    !resource.is_standby() && !leader
}

async fn write_cache(resource: &dyn Resource) -> Result<()> {
    let path = cache_file(resource);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).await?;
    }
    fs::write(&path, b"").await?;
    Ok(())
}

async fn clear_cache(resource: &dyn Resource) -> Result<()> {
    match fs::remove_file(cache_file(resource)).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
