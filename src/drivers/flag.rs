//! Flag Resource Driver
//!
//! The simplest possible resource: up when its flag file exists, down when
//! it does not. Useful as a cluster-wide boolean and as the smoke-test
//! driver for action plumbing.

use crate::driver::{
    ContextKind, ContextRef, DriverAllocator, DriverGroup, Manifest, ResourceConfig,
};
use crate::error::Result;
use crate::resource::{ProvisionState, Resource, ResourceCore};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

pub const DRIVER_NAME: &str = "flag";

// =============================================================================
// Allocator
// =============================================================================

/// Allocator for `fs.flag` resources
pub struct FlagDriver;

impl FlagDriver {
    pub fn manifest() -> Manifest {
        Manifest::new(DriverGroup::Fs, DRIVER_NAME)
            .add_context(ContextRef::new("path", ContextKind::ObjectPath))
    }
}

impl DriverAllocator for FlagDriver {
    fn manifest(&self) -> Manifest {
        Self::manifest()
    }

    fn allocate(&self, config: ResourceConfig) -> Result<Box<dyn Resource>> {
        Ok(Box::new(FlagResource {
            core: ResourceCore::from_config(config),
        }))
    }
}

// =============================================================================
// Resource
// =============================================================================

/// One flag-file resource instance
pub struct FlagResource {
    core: ResourceCore,
}

impl FlagResource {
    fn flag_file(&self) -> PathBuf {
        self.var_dir().join("flag")
    }

    async fn touch(&self) -> Result<()> {
        let path = self.flag_file();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        fs::write(&path, b"").await?;
        Ok(())
    }

    async fn remove(&self) -> Result<()> {
        match fs::remove_file(self.flag_file()).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl Resource for FlagResource {
    fn core(&self) -> &ResourceCore {
        &self.core
    }

    fn manifest(&self) -> Manifest {
        FlagDriver::manifest()
    }

    async fn start(&self) -> Result<()> {
        if self.flag_file().exists() {
            info!("Resource {} already up", self.rid());
            return Ok(());
        }
        self.touch().await?;
        self.log().info("flag created");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.remove().await?;
        self.log().info("flag removed");
        Ok(())
    }

    async fn provisioned(&self) -> Result<ProvisionState> {
        Ok(self.flag_file().exists().into())
    }

    async fn provision_leader(&self) -> Result<()> {
        self.touch().await
    }

    async fn unprovision_leader(&self) -> Result<()> {
        self.remove().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::provision;

    fn flag_resource(tmp: &tempfile::TempDir) -> FlagResource {
        let config = ResourceConfig::new("fs#1".parse().unwrap(), tmp.path());
        FlagResource {
            core: ResourceCore::from_config(config),
        }
    }

    #[tokio::test]
    async fn test_start_stop_cycle() {
        let tmp = tempfile::tempdir().unwrap();
        let resource = flag_resource(&tmp);

        assert_eq!(
            resource.provisioned().await.unwrap(),
            ProvisionState::Unprovisioned
        );

        resource.start().await.unwrap();
        assert!(resource.flag_file().exists());
        assert_eq!(
            resource.provisioned().await.unwrap(),
            ProvisionState::Provisioned
        );

        // idempotent
        resource.start().await.unwrap();

        resource.stop().await.unwrap();
        assert!(!resource.flag_file().exists());
    }

    #[tokio::test]
    async fn test_provision_through_state_machine() {
        let tmp = tempfile::tempdir().unwrap();
        let resource = flag_resource(&tmp);

        provision::provision(&resource, true).await.unwrap();
        assert_eq!(
            resource.provisioned().await.unwrap(),
            ProvisionState::Provisioned
        );

        let st = provision::status(&resource).await;
        assert_eq!(st.state, ProvisionState::Provisioned);
        assert!(st.mtime.is_some());

        provision::unprovision(&resource, true).await.unwrap();
        assert_eq!(
            resource.provisioned().await.unwrap(),
            ProvisionState::Unprovisioned
        );
    }

    #[test]
    fn test_allocator() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ResourceConfig::new("fs#1".parse().unwrap(), tmp.path());
        let resource = FlagDriver.allocate(config).unwrap();
        assert_eq!(resource.rid().to_string(), "fs#1");
        assert_eq!(resource.manifest().name, DRIVER_NAME);
    }
}
