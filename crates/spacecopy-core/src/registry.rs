use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use spacecopy_api::ServiceInstance;

/// How one destination service was reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceOutcome {
    /// A same-named instance already existed and was left untouched.
    Reused,
    /// No same-named instance existed; one was created.
    Created,
    /// A same-named instance was torn down and rebuilt.
    Recreated,
}

impl fmt::Display for ServiceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reused => write!(f, "reused"),
            Self::Created => write!(f, "created"),
            Self::Recreated => write!(f, "recreated"),
        }
    }
}

/// Destination-side results of a copy, keyed by service name and by
/// application name.
#[derive(Debug, Clone, Default)]
pub struct BindingRegistry {
    instances: IndexMap<String, ServiceInstance>,
    outcomes: IndexMap<String, ServiceOutcome>,
    app_bindings: HashMap<String, Vec<String>>,
}

impl BindingRegistry {
    /// Records the re-read destination instance of a service.
    pub(crate) fn record_instance(&mut self, instance: ServiceInstance, outcome: ServiceOutcome) {
        self.outcomes.insert(instance.name.clone(), outcome);
        self.instances.insert(instance.name.clone(), instance);
    }

    /// Appends a destination instance GUID to each application's binding list.
    pub(crate) fn expect_bindings<'a, I>(&mut self, app_names: I, instance_guid: &str)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for app in app_names {
            self.app_bindings
                .entry(app.clone())
                .or_default()
                .push(instance_guid.to_string());
        }
    }

    pub fn app_bindings(&self, app_name: &str) -> Option<&[String]> {
        self.app_bindings.get(app_name).map(Vec::as_slice)
    }

    pub fn instance(&self, service_name: &str) -> Option<&ServiceInstance> {
        self.instances.get(service_name)
    }

    pub fn outcome(&self, service_name: &str) -> Option<ServiceOutcome> {
        self.outcomes.get(service_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_accumulate_across_services() {
        let mut registry = BindingRegistry::default();
        let apps = vec!["app1".to_string(), "app2".to_string()];

        registry.expect_bindings(&apps, "guid-a");
        registry.expect_bindings(&apps[..1], "guid-b");

        assert_eq!(
            registry.app_bindings("app1"),
            Some(&["guid-a".to_string(), "guid-b".to_string()][..])
        );
        assert_eq!(registry.app_bindings("app2"), Some(&["guid-a".to_string()][..]));
        assert_eq!(registry.app_bindings("app3"), None);
    }

    #[test]
    fn test_outcome_recorded_by_name() {
        let mut registry = BindingRegistry::default();
        registry.record_instance(
            ServiceInstance {
                guid: "guid-a".into(),
                name: "svc3".into(),
                ..Default::default()
            },
            ServiceOutcome::Recreated,
        );

        assert_eq!(registry.outcome("svc3"), Some(ServiceOutcome::Recreated));
        assert_eq!(registry.instance("svc3").unwrap().guid, "guid-a");
        assert_eq!(ServiceOutcome::Reused.to_string(), "reused");
    }
}
