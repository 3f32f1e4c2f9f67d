//! Simple App Driver
//!
//! Starts and stops an application through shell commands declared in the
//! object configuration. Apps own no provisionable state, so the
//! provisioning probe reports n/a and the default leader hooks apply.

use crate::driver::{
    ContextKind, ContextRef, DriverAllocator, DriverGroup, Keyword, Manifest, ResourceConfig,
};
use crate::error::{Error, Result};
use crate::resource::{ProvisionState, Resource, ResourceCore};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

pub const DRIVER_NAME: &str = "simple";

// =============================================================================
// Allocator
// =============================================================================

/// Allocator for `app.simple` resources
pub struct AppDriver;

impl AppDriver {
    pub fn manifest() -> Manifest {
        Manifest::new(DriverGroup::App, DRIVER_NAME)
            .add_keyword(
                Keyword::new("start", "Command to start the application")
                    .scopable()
                    .with_example("/usr/local/bin/myapp --daemon"),
            )
            .add_keyword(
                Keyword::new("stop", "Command to stop the application")
                    .scopable()
                    .with_example("/usr/local/bin/myapp --kill"),
            )
            .add_context(ContextRef::new("path", ContextKind::ObjectPath))
            .add_context(ContextRef::new("nodes", ContextKind::Nodes))
    }
}

impl DriverAllocator for AppDriver {
    fn manifest(&self) -> Manifest {
        Self::manifest()
    }

    fn allocate(&self, config: ResourceConfig) -> Result<Box<dyn Resource>> {
        let start_cmd = config.option("start").map(String::from);
        let stop_cmd = config.option("stop").map(String::from);
        Ok(Box::new(AppResource {
            core: ResourceCore::from_config(config),
            start_cmd,
            stop_cmd,
        }))
    }
}

// =============================================================================
// Resource
// =============================================================================

/// One command-driven application resource instance
pub struct AppResource {
    core: ResourceCore,
    start_cmd: Option<String>,
    stop_cmd: Option<String>,
}

impl AppResource {
    async fn run_command(&self, command: &str) -> Result<()> {
        info!("Resource {}: running '{}'", self.rid(), command);
        let status = Command::new("sh").arg("-c").arg(command).status().await?;
        if status.success() {
            self.log().info(format!("'{}' succeeded", command));
            Ok(())
        } else {
            Err(Error::CommandFailed {
                command: command.to_string(),
                code: status.code(),
            })
        }
    }
}

#[async_trait]
impl Resource for AppResource {
    fn core(&self) -> &ResourceCore {
        &self.core
    }

    fn manifest(&self) -> Manifest {
        AppDriver::manifest()
    }

    async fn start(&self) -> Result<()> {
        match &self.start_cmd {
            Some(command) => self.run_command(command).await,
            None => {
                debug!("Resource {}: no start command", self.rid());
                Ok(())
            }
        }
    }

    async fn stop(&self) -> Result<()> {
        match &self.stop_cmd {
            Some(command) => self.run_command(command).await,
            None => {
                debug!("Resource {}: no stop command", self.rid());
                Ok(())
            }
        }
    }

    async fn provisioned(&self) -> Result<ProvisionState> {
        Ok(ProvisionState::NotApplicable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn app(tmp: &tempfile::TempDir, start: Option<&str>, stop: Option<&str>) -> Box<dyn Resource> {
        let mut config = ResourceConfig::new("app#1".parse().unwrap(), tmp.path());
        if let Some(start) = start {
            config.options.insert("start".into(), start.into());
        }
        if let Some(stop) = stop {
            config.options.insert("stop".into(), stop.into());
        }
        AppDriver.allocate(config).unwrap()
    }

    #[tokio::test]
    async fn test_start_runs_command() {
        let tmp = tempfile::tempdir().unwrap();
        let witness = tmp.path().join("started");
        let cmd = format!("touch {}", witness.display());
        let resource = app(&tmp, Some(&cmd), None);

        resource.start().await.unwrap();
        assert!(witness.exists());
    }

    #[tokio::test]
    async fn test_failed_command_maps_to_error() {
        let tmp = tempfile::tempdir().unwrap();
        let resource = app(&tmp, Some("exit 3"), None);

        let err = resource.start().await.unwrap_err();
        assert_matches!(err, Error::CommandFailed { code: Some(3), .. });
    }

    #[tokio::test]
    async fn test_missing_commands_are_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let resource = app(&tmp, None, None);

        resource.start().await.unwrap();
        resource.stop().await.unwrap();
        assert_eq!(
            resource.provisioned().await.unwrap(),
            ProvisionState::NotApplicable
        );
    }

    #[test]
    fn test_manifest_keywords() {
        let manifest = AppDriver::manifest();
        let options: Vec<&str> = manifest.keywords.iter().map(|k| k.option.as_str()).collect();
        assert_eq!(options, vec!["start", "stop"]);
    }
}
