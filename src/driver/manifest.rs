//! Driver Manifests
//!
//! A manifest declares what a driver consumes: the configuration keywords it
//! understands and the object-level context values it expects merged into its
//! instance at construction time. Manifests are pure metadata, immutable once
//! built, and have no effect on execution ordering.

use super::{DriverGroup, DriverId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Keyword
// =============================================================================

/// One configuration option a driver consumes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    /// Option name in the object configuration
    pub option: String,
    /// Whether the option can be scoped per node
    pub scopable: bool,
    /// Default value when unset
    pub default: Option<String>,
    /// Example value for documentation
    pub example: Option<String>,
    /// Human description
    pub text: String,
}

impl Keyword {
    pub fn new(option: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            option: option.into(),
            scopable: false,
            default: None,
            example: None,
            text: text.into(),
        }
    }

    pub fn scopable(mut self) -> Self {
        self.scopable = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }
}

// =============================================================================
// Context References
// =============================================================================

/// Object-level values a driver expects at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    /// The owning object's path (e.g. `ns1/svc/web`)
    ObjectPath,
    /// The object's node list
    Nodes,
    /// The object's topology (failover, flex)
    Topology,
}

/// Binding of a context value to a driver instance attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRef {
    /// Attribute name on the driver instance
    pub name: String,
    /// Which object-level value is merged in
    pub kind: ContextKind,
}

impl ContextRef {
    pub fn new(name: impl Into<String>, kind: ContextKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

// =============================================================================
// Manifest
// =============================================================================

/// Per-driver-type declaration of consumed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub group: DriverGroup,
    pub name: String,
    pub keywords: Vec<Keyword>,
    pub context: Vec<ContextRef>,
}

impl Manifest {
    pub fn new(group: DriverGroup, name: impl Into<String>) -> Self {
        Self {
            group,
            name: name.into(),
            keywords: Vec::new(),
            context: Vec::new(),
        }
    }

    pub fn add_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    pub fn add_context(mut self, context: ContextRef) -> Self {
        self.context.push(context);
        self
    }

    /// The driver identity this manifest describes
    pub fn driver_id(&self) -> DriverId {
        DriverId::new(self.group, self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_build() {
        let manifest = Manifest::new(DriverGroup::App, "simple")
            .add_keyword(
                Keyword::new("start", "Command to start the application")
                    .scopable()
                    .with_example("/usr/bin/myapp --daemon"),
            )
            .add_context(ContextRef::new("path", ContextKind::ObjectPath));

        assert_eq!(manifest.driver_id().to_string(), "app.simple");
        assert_eq!(manifest.keywords.len(), 1);
        assert!(manifest.keywords[0].scopable);
        assert_eq!(manifest.context[0].kind, ContextKind::ObjectPath);
    }

    #[test]
    fn test_manifest_serialize() {
        let manifest = Manifest::new(DriverGroup::Fs, "flag");
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(json.contains("\"group\":\"fs\""));
        assert!(json.contains("\"name\":\"flag\""));
    }
}
