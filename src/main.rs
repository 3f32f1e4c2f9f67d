//! Service Orchestrator CLI
//!
//! Thin composition root over the orchestration library: registers the
//! built-in drivers, exposes registry introspection, and can run a start or
//! stop action over a local object definition file. Cluster-wide action
//! routing, dependency resolution and leader election live in the daemon,
//! not here.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use svc_orchestrator::{
    drivers, DriverId, DriverRegistry, Error, ResourceConfig, ResourceList, ResourceRef,
    ResourceSet, Rid,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Service Orchestrator - resource action engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered drivers
    Drivers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a driver manifest as JSON
    Manifest {
        /// Driver id (e.g. fs.flag)
        id: String,
    },
    /// Run an action over an object definition file
    Run {
        /// Path to the object definition (JSON)
        object: PathBuf,
        /// Action to run (start, stop)
        action: String,
    },
}

// =============================================================================
// Object Definition
// =============================================================================

/// Local object definition consumed by the demo runner
#[derive(Debug, Deserialize)]
struct ObjectDef {
    path: String,
    #[serde(default)]
    nodes: Vec<String>,
    #[serde(default)]
    topology: Option<String>,
    var_dir: PathBuf,
    #[serde(default)]
    subsets: Vec<SubsetDef>,
    resources: Vec<ResourceDef>,
}

#[derive(Debug, Deserialize)]
struct SubsetDef {
    section: String,
    #[serde(default)]
    parallel: bool,
}

#[derive(Debug, Deserialize)]
struct ResourceDef {
    rid: String,
    /// Driver id; defaults to the rid group's generic entry
    #[serde(default)]
    driver: Option<String>,
    #[serde(default)]
    subset: Option<String>,
    #[serde(default)]
    disable: bool,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    standby: bool,
    #[serde(default)]
    shared: bool,
    #[serde(default)]
    monitored: bool,
    #[serde(default)]
    encap: bool,
    #[serde(default)]
    options: BTreeMap<String, String>,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let mut registry = DriverRegistry::new();
    drivers::register_builtin(&mut registry);

    match args.command {
        Command::Drivers { json } => list_drivers(&registry, json),
        Command::Manifest { id } => print_manifest(&registry, &id),
        Command::Run { object, action } => run_action(&registry, &object, &action).await,
    }
}

fn list_drivers(registry: &DriverRegistry, json: bool) -> Result<()> {
    let mut ids: Vec<String> = registry.list().iter().map(|id| id.to_string()).collect();
    ids.sort();

    if json {
        println!("{}", serde_json::to_string_pretty(&ids)?);
    } else {
        for id in ids {
            println!("{}", id);
        }
    }
    Ok(())
}

fn print_manifest(registry: &DriverRegistry, id: &str) -> Result<()> {
    let id: DriverId = id.parse()?;
    let allocator = registry
        .get(&id)
        .ok_or_else(|| Error::DriverNotFound { id: id.to_string() })?;
    println!("{}", serde_json::to_string_pretty(&allocator.manifest())?);
    Ok(())
}

// =============================================================================
// Demo Action Runner
// =============================================================================

async fn run_action(registry: &DriverRegistry, object: &PathBuf, action: &str) -> Result<()> {
    if !matches!(action, "start" | "stop") {
        return Err(Error::Configuration(format!("unsupported action: {}", action)).into());
    }

    let raw = std::fs::read_to_string(object)
        .with_context(|| format!("reading object definition {}", object.display()))?;
    let def: ObjectDef = serde_json::from_str(&raw)
        .with_context(|| format!("parsing object definition {}", object.display()))?;

    info!("Object {}: {} ({} resources)", def.path, action, def.resources.len());

    let mut resources = build_resources(registry, &def)?;
    resources.sort();

    // actionable resources, in bring-up order (reversed for stop)
    let mut ordered: Vec<ResourceRef> = resources
        .iter()
        .filter(|r| !r.is_disabled())
        .cloned()
        .collect();
    if action == "stop" {
        ordered.reverse();
    }

    for set in partition(&def, &ordered)? {
        info!("Running {} over {}", action, set);
        match action {
            "start" => set.run(&ordered, |r| async move { r.start().await }).await?,
            _ => set.run(&ordered, |r| async move { r.stop().await }).await?,
        }
    }

    info!("Object {}: {} complete", def.path, action);
    Ok(())
}

fn build_resources(registry: &DriverRegistry, def: &ObjectDef) -> Result<ResourceList> {
    let mut resources = ResourceList::new();
    for res_def in &def.resources {
        let rid: Rid = res_def.rid.parse()?;
        let driver_id = match &res_def.driver {
            Some(driver) => driver.parse()?,
            None => DriverId::generic(rid.group),
        };
        let allocator = registry.get(&driver_id).ok_or_else(|| Error::DriverNotFound {
            id: driver_id.to_string(),
        })?;

        let mut config = ResourceConfig::new(rid, def.var_dir.as_path());
        config.subset = res_def.subset.clone();
        config.disable = res_def.disable;
        config.optional = res_def.optional;
        config.standby = res_def.standby;
        config.shared = res_def.shared;
        config.monitored = res_def.monitored;
        config.encap = res_def.encap;
        config.object_path = def.path.clone();
        config.nodes = def.nodes.clone();
        config.topology = def.topology.clone();
        config.options = res_def.options.clone();

        resources.push(Arc::from(allocator.allocate(config)?));
    }
    Ok(resources)
}

/// Resource sets covering `ordered`, in encounter order
fn partition(def: &ObjectDef, ordered: &[ResourceRef]) -> Result<Vec<ResourceSet>> {
    let mut sections: Vec<String> = Vec::new();
    for resource in ordered {
        let section =
            ResourceSet::format_section_name(resource.driver_group(), resource.subset());
        if !sections.contains(&section) {
            sections.push(section);
        }
    }

    let mut sets = Vec::new();
    for section in sections {
        let mut set = ResourceSet::parse(&section)?;
        if let Some(subset_def) = def.subsets.iter().find(|s| s.section == section) {
            set.parallel = subset_def.parallel;
        }
        sets.push(set);
    }
    Ok(sets)
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
