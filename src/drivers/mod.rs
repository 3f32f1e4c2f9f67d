//! Built-in Resource Drivers
//!
//! Reference drivers shipped with the orchestrator:
//! - `fs.flag`: flag-file presence (the simplest possible resource)
//! - `app.simple`: shell command start/stop
//!
//! Registration is an explicit composition step, not an import-time side
//! effect: the composing application calls [`register_builtin`] once at
//! startup, before any lookup occurs.

pub mod app;
pub mod flag;

use crate::driver::{DriverGroup, DriverId, DriverRegistry};
use std::sync::Arc;

/// Register every built-in driver
pub fn register_builtin(registry: &mut DriverRegistry) {
    registry.register(
        DriverId::new(DriverGroup::Fs, flag::DRIVER_NAME),
        Arc::new(flag::FlagDriver),
    );
    registry.register(
        DriverId::new(DriverGroup::App, app::DRIVER_NAME),
        Arc::new(app::AppDriver),
    );
    // app.simple also answers lookups for the bare app group
    registry.register(DriverId::generic(DriverGroup::App), Arc::new(app::AppDriver));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registration() {
        let mut registry = DriverRegistry::new();
        register_builtin(&mut registry);

        assert!(registry
            .get_strict(&DriverId::new(DriverGroup::Fs, "flag"))
            .is_some());
        assert!(registry
            .get_strict(&DriverId::new(DriverGroup::App, "simple"))
            .is_some());

        // the group-default entry answers for unregistered app names
        let fallback = registry.get(&DriverId::new(DriverGroup::App, "forking"));
        assert!(fallback.is_some());
        assert_eq!(fallback.unwrap().manifest().name, "simple");
    }
}
