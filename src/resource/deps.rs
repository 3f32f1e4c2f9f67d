//! Action Dependencies
//!
//! An explicit edge store refining resource ordering for two action families
//! (start-like, stop-like) and two dependency kinds (selection vs execution).
//! The store only registers and retrieves edges; topological sorting and
//! cycle detection belong to the action runner.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

// =============================================================================
// Action Family
// =============================================================================

/// Ordering family a raw action name maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionFamily {
    Start,
    Stop,
}

impl ActionFamily {
    /// Normalize a raw action name
    ///
    /// Actions outside the two families carry no dependency edges; they
    /// normalize to `None` and every query for them is empty.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "provision" | "start" => Some(ActionFamily::Start),
            "shutdown" | "unprovision" | "stop" | "toc" => Some(ActionFamily::Stop),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActionFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionFamily::Start => write!(f, "start"),
            ActionFamily::Stop => write!(f, "stop"),
        }
    }
}

// =============================================================================
// Dependency Edge
// =============================================================================

/// What a dependency edge constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepKind {
    /// `depends_on` must be selected alongside `rid` for consistency
    Select,
    /// `depends_on`'s action must complete before `rid`'s
    Act,
}

impl std::fmt::Display for DepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepKind::Select => write!(f, "select"),
            DepKind::Act => write!(f, "act"),
        }
    }
}

/// One dependency edge: under `action`, for `kind`, `rid` depends on `depends_on`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dep {
    pub action: String,
    pub kind: DepKind,
    pub rid: String,
    pub depends_on: String,
}

impl Dep {
    pub fn new(
        action: impl Into<String>,
        kind: DepKind,
        rid: impl Into<String>,
        depends_on: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            kind,
            rid: rid.into(),
            depends_on: depends_on.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DepKey {
    family: ActionFamily,
    kind: DepKind,
    rid: String,
}

// =============================================================================
// Dependency Store
// =============================================================================

/// Thread-safe edge repository keyed by (normalized action, kind, rid)
///
/// A single mutex guards all reads and writes; the store is small and
/// queried at low frequency, so exclusive locking keeps the semantics
/// simple.
#[derive(Debug, Default)]
pub struct DependencyStore {
    deps: Mutex<HashMap<DepKey, BTreeSet<String>>>,
}

impl DependencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one edge. Duplicates collapse.
    pub fn register(&self, dep: Dep) {
        let family = match ActionFamily::parse(&dep.action) {
            Some(family) => family,
            None => {
                debug!(
                    "Ignoring dependency for unhandled action: {} ({} -> {})",
                    dep.action, dep.rid, dep.depends_on
                );
                return;
            }
        };
        let key = DepKey {
            family,
            kind: dep.kind,
            rid: dep.rid,
        };
        self.deps.lock().entry(key).or_default().insert(dep.depends_on);
    }

    /// Insert a batch of edges
    pub fn register_slice(&self, deps: impl IntoIterator<Item = Dep>) {
        for dep in deps {
            self.register(dep);
        }
    }

    /// Resource ids that must be selected alongside `rid` under `action`
    pub fn select_dependencies(&self, action: &str, rid: &str) -> Vec<String> {
        self.query(action, DepKind::Select, rid)
    }

    /// Resource ids whose action must complete before `rid`'s under `action`
    pub fn act_dependencies(&self, action: &str, rid: &str) -> Vec<String> {
        self.query(action, DepKind::Act, rid)
    }

    fn query(&self, action: &str, kind: DepKind, rid: &str) -> Vec<String> {
        let family = match ActionFamily::parse(action) {
            Some(family) => family,
            None => return Vec::new(),
        };
        let key = DepKey {
            family,
            kind,
            rid: rid.to_string(),
        };
        self.deps
            .lock()
            .get(&key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}
