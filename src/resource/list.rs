//! Resource Ordering
//!
//! A sortable resource collection. The sort order is the default execution
//! sequence for an object's resources: driver group first (groups are
//! declared in bring-up order), subset name second, resource id name third.
//!
//! Also provides set algebra over resource id membership so callers can
//! compute "resources affected by this action" without re-deriving order.

use super::ResourceRef;

/// Ordered collection of resources
#[derive(Clone, Default)]
pub struct ResourceList {
    resources: Vec<ResourceRef>,
}

impl ResourceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, resource: ResourceRef) {
        self.resources.push(resource);
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceRef> {
        self.resources.iter()
    }

    /// The underlying slice, in current order
    pub fn resources(&self) -> &[ResourceRef] {
        &self.resources
    }

    /// Sort into bring-up order: group, then subset name, then rid name
    pub fn sort(&mut self) {
        self.resources.sort_by_key(|r| {
            (
                r.driver_group().order(),
                r.subset().to_string(),
                r.rid().name.clone(),
            )
        });
    }

    /// Whether a resource with this rid is present
    pub fn has(&self, rid: &str) -> bool {
        self.resources.iter().any(|r| r.rid().to_string() == rid)
    }

    /// Elements of `self` present in `other`, in `self`'s order
    pub fn intersection(&self, other: &ResourceList) -> ResourceList {
        self.resources
            .iter()
            .filter(|r| other.has(&r.rid().to_string()))
            .cloned()
            .collect()
    }

    /// `self` followed by `other`'s elements not already present
    pub fn union(&self, other: &ResourceList) -> ResourceList {
        let mut merged = self.clone();
        for resource in &other.resources {
            if !merged.has(&resource.rid().to_string()) {
                merged.push(resource.clone());
            }
        }
        merged
    }
}

impl FromIterator<ResourceRef> for ResourceList {
    fn from_iter<I: IntoIterator<Item = ResourceRef>>(iter: I) -> Self {
        Self {
            resources: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<ResourceRef>> for ResourceList {
    fn from(resources: Vec<ResourceRef>) -> Self {
        Self { resources }
    }
}
