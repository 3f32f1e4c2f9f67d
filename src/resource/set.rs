//! Resource Sets
//!
//! A resource set partitions an object's resources by (driver group, subset
//! name) and executes a caller-supplied action function over the partition,
//! serially or concurrently, tolerating optional-resource failures.
//!
//! The caller is responsible for pre-sorting the resources it passes in;
//! serial execution honors the given order exactly.

use super::{Resource, ResourceRef};
use crate::driver::DriverGroup;
use crate::error::{Error, Result};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, warn};

/// Section name prefix of every resource set
pub const SECTION_PREFIX: &str = "subset#";

// =============================================================================
// Resource Set
// =============================================================================

/// Execution partition over one (driver group, subset name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet {
    /// Subset name; empty for the group's default set
    pub name: String,
    /// Canonical section name (`subset#<group>[:<name>]`)
    pub section_name: String,
    pub driver_group: DriverGroup,
    /// Run members concurrently instead of in sequence
    pub parallel: bool,
}

impl ResourceSet {
    /// Parse a section name of the form `subset#<group>[:<name>]`
    pub fn parse(section_name: &str) -> Result<Self> {
        let rest = section_name
            .strip_prefix(SECTION_PREFIX)
            .ok_or_else(|| Error::SectionFormat {
                section: section_name.to_string(),
            })?;
        let (group, name) = match rest.split_once(':') {
            Some((group, name)) => (group, name),
            None => (rest, ""),
        };
        let driver_group = group.parse::<DriverGroup>()?;
        Ok(Self {
            name: name.to_string(),
            section_name: Self::format_section_name(driver_group, name),
            driver_group,
            parallel: false,
        })
    }

    /// The default set of a driver group
    pub fn generic(group_name: &str) -> Result<Self> {
        Self::parse(&format!("{}{}", SECTION_PREFIX, group_name))
    }

    /// Canonical section name for a (group, subset name) pair
    pub fn format_section_name(group: DriverGroup, name: &str) -> String {
        if name.is_empty() {
            format!("{}{}", SECTION_PREFIX, group)
        } else {
            format!("{}{}:{}", SECTION_PREFIX, group, name)
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Whether this set selects a resource
    pub fn selects(&self, resource: &dyn Resource) -> bool {
        resource.driver_group() == self.driver_group && resource.subset() == self.name
    }

    /// The subsequence of `resources` this set selects, in given order
    pub fn filter(&self, resources: &[ResourceRef]) -> Vec<ResourceRef> {
        resources
            .iter()
            .filter(|r| self.selects(r.as_ref()))
            .cloned()
            .collect()
    }

    /// Execute `action` over the resources this set selects
    ///
    /// Serial mode invokes resources in the order they were given and halts
    /// on the first non-optional failure. Parallel mode dispatches every
    /// resource, joins on all of them, and aggregates non-optional failures;
    /// there is no meaningful "next in line" to protect by stopping early.
    ///
    /// Optional-resource failures are logged and invisible to the caller in
    /// both modes. No retries: retry is an external policy.
    pub async fn run<F, Fut>(&self, resources: &[ResourceRef], action: F) -> Result<()>
    where
        F: Fn(ResourceRef) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let selected = self.filter(resources);
        debug!(
            "Resource set {}: {} resource(s) selected, parallel={}",
            self.section_name,
            selected.len(),
            self.parallel
        );
        if self.parallel {
            self.run_parallel(selected, action).await
        } else {
            self.run_serial(selected, action).await
        }
    }

    async fn run_serial<F, Fut>(&self, selected: Vec<ResourceRef>, action: F) -> Result<()>
    where
        F: Fn(ResourceRef) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        for resource in selected {
            if let Err(err) = action(resource.clone()).await {
                if resource.is_optional() {
                    tolerate(resource.as_ref(), &err);
                    continue;
                }
                return Err(Error::ResourceAction {
                    rid: resource.rid().to_string(),
                    source: Box::new(err),
                });
            }
        }
        Ok(())
    }

    async fn run_parallel<F, Fut>(&self, selected: Vec<ResourceRef>, action: F) -> Result<()>
    where
        F: Fn(ResourceRef) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let tasks = selected.iter().map(|resource| {
            let resource = resource.clone();
            let fut = action(resource.clone());
            async move { (resource, fut.await) }
        });

        let mut failures = Vec::new();
        for (resource, result) in join_all(tasks).await {
            if let Err(err) = result {
                if resource.is_optional() {
                    tolerate(resource.as_ref(), &err);
                } else {
                    failures.push(format!("{}: {}", resource.rid(), err));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::ResourceSetFailed {
                section: self.section_name.clone(),
                failures,
            })
        }
    }
}

/// Record an optional-resource failure without surfacing it
fn tolerate(resource: &dyn Resource, err: &Error) {
    warn!(
        "Resource {} failed (optional, continuing): {}",
        resource.rid(),
        err
    );
    resource
        .log()
        .warn(format!("optional resource failed: {}", err));
}

impl std::fmt::Display for ResourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.section_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testutil::TestResource;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    #[test]
    fn test_parse_canonical() {
        let set = ResourceSet::parse("subset#fs:g1").unwrap();
        assert_eq!(set.driver_group, DriverGroup::Fs);
        assert_eq!(set.name, "g1");
        assert_eq!(set.to_string(), "subset#fs:g1");

        let set = ResourceSet::parse("subset#app").unwrap();
        assert_eq!(set.driver_group, DriverGroup::App);
        assert!(set.name.is_empty());
        assert_eq!(set.to_string(), "subset#app");
    }

    #[test]
    fn test_parse_round_trip() {
        let section = ResourceSet::format_section_name(DriverGroup::Fs, "g1");
        let set = ResourceSet::parse(&section).unwrap();
        assert_eq!(set.to_string(), section);
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        let err = ResourceSet::parse("fs:g1").unwrap_err();
        assert_matches!(err, Error::SectionFormat { section } if section == "fs:g1");
    }

    #[test]
    fn test_parse_rejects_unknown_group() {
        let err = ResourceSet::parse("subset#bogus").unwrap_err();
        assert_matches!(err, Error::UnknownDriverGroup { group } if group == "bogus");
    }

    #[test]
    fn test_generic() {
        let set = ResourceSet::generic("container").unwrap();
        assert_eq!(set.driver_group, DriverGroup::Container);
        assert_eq!(set.to_string(), "subset#container");
    }

    #[test]
    fn test_filter_matches_group_and_subset() {
        let in_set = Arc::new(TestResource::new("fs#1").with_subset("g1"));
        let wrong_subset = Arc::new(TestResource::new("fs#2"));
        let wrong_group = Arc::new(TestResource::new("app#1").with_subset("g1"));
        let resources: Vec<ResourceRef> = vec![in_set, wrong_subset, wrong_group];

        let set = ResourceSet::parse("subset#fs:g1").unwrap();
        let selected = set.filter(&resources);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].rid().to_string(), "fs#1");
    }

    #[tokio::test]
    async fn test_serial_tolerates_optional_failure() {
        let r1 = Arc::new(TestResource::new("app#1").optional().fail_start());
        let r2 = Arc::new(TestResource::new("app#2"));
        let resources: Vec<ResourceRef> = vec![r1.clone(), r2.clone()];

        let set = ResourceSet::generic("app").unwrap();
        let result = set.run(&resources, |r| async move { r.start().await }).await;

        assert!(result.is_ok());
        assert_eq!(r1.calls(), vec!["start"]);
        assert_eq!(r2.calls(), vec!["start"]);
        // the failure landed in the status log, not the caller
        assert_eq!(r1.log().len(), 1);
    }

    #[tokio::test]
    async fn test_serial_aborts_on_required_failure() {
        let r1 = Arc::new(TestResource::new("app#1").fail_start());
        let r2 = Arc::new(TestResource::new("app#2"));
        let resources: Vec<ResourceRef> = vec![r1.clone(), r2.clone()];

        let set = ResourceSet::generic("app").unwrap();
        let err = set
            .run(&resources, |r| async move { r.start().await })
            .await
            .unwrap_err();

        assert_matches!(&err, Error::ResourceAction { rid, .. } if rid == "app#1");
        assert!(err.to_string().contains("app#1 start failed"));
        // resources after the failing one are never invoked
        assert!(r2.calls().is_empty());
    }

    #[tokio::test]
    async fn test_serial_honors_given_order() {
        let r1 = Arc::new(TestResource::new("app#2"));
        let r2 = Arc::new(TestResource::new("app#1"));
        let resources: Vec<ResourceRef> = vec![r1.clone(), r2.clone()];

        let order = parking_lot::Mutex::new(Vec::new());
        let set = ResourceSet::generic("app").unwrap();
        set.run(&resources, |r| {
            order.lock().push(r.rid().to_string());
            async move { r.start().await }
        })
        .await
        .unwrap();

        // given order, not sorted order
        assert_eq!(*order.lock(), vec!["app#2", "app#1"]);
    }

    #[tokio::test]
    async fn test_parallel_tolerates_optional_failure() {
        let r1 = Arc::new(TestResource::new("app#1").optional().fail_start());
        let r2 = Arc::new(TestResource::new("app#2"));
        let resources: Vec<ResourceRef> = vec![r1.clone(), r2.clone()];

        let set = ResourceSet::generic("app").unwrap().with_parallel(true);
        let result = set.run(&resources, |r| async move { r.start().await }).await;

        assert!(result.is_ok());
        assert_eq!(r1.calls(), vec!["start"]);
        assert_eq!(r2.calls(), vec!["start"]);
    }

    #[tokio::test]
    async fn test_parallel_aggregates_required_failures() {
        let r1 = Arc::new(TestResource::new("app#1").fail_start());
        let r2 = Arc::new(TestResource::new("app#2").fail_start());
        let r3 = Arc::new(TestResource::new("app#3"));
        let resources: Vec<ResourceRef> = vec![r1.clone(), r2.clone(), r3.clone()];

        let set = ResourceSet::generic("app").unwrap().with_parallel(true);
        let err = set
            .run(&resources, |r| async move { r.start().await })
            .await
            .unwrap_err();

        // no short-circuit: every resource ran
        assert_eq!(r3.calls(), vec!["start"]);
        match err {
            Error::ResourceSetFailed { section, failures } => {
                assert_eq!(section, "subset#app");
                assert_eq!(failures.len(), 2);
                assert!(failures.iter().any(|f| f.starts_with("app#1")));
                assert!(failures.iter().any(|f| f.starts_with("app#2")));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
