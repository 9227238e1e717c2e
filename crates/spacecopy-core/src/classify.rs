//! Decides how each source service is represented at the destination.

use std::collections::BTreeSet;

use spacecopy_api::{ServiceInstance, UserProvidedService};

/// Which managed services are copied as user-provided services.
///
/// A managed service is bridged when its name or its offering label is listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyPolicy {
    instances_as_ups: BTreeSet<String>,
    offering_labels_as_ups: BTreeSet<String>,
}

impl CopyPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instances_as_ups<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instances_as_ups.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_offering_labels_as_ups<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.offering_labels_as_ups
            .extend(labels.into_iter().map(Into::into));
        self
    }

    /// Returns `true` if the instance should be copied through a credential bridge.
    pub fn wants_bridge(&self, instance: &ServiceInstance) -> bool {
        self.instances_as_ups.contains(&instance.name)
            || self
                .offering_labels_as_ups
                .contains(&instance.service_offering.label)
    }
}

/// Copy strategy chosen for one source service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification<'a> {
    /// Already a user-provided service; copy name and credentials as-is.
    Passthrough(&'a UserProvidedService),
    /// Managed service represented at the destination as a user-provided
    /// service carrying the credentials of a source service key.
    CredentialBridge,
    /// Managed service re-provisioned at the destination from the same
    /// offering label and plan name.
    ManagedClone,
}

/// Returns the requested application names the instance is bound to, in the
/// instance's binding order, or `None` if it is bound to none of them.
pub fn narrow_bindings(instance: &ServiceInstance, app_names: &[String]) -> Option<Vec<String>> {
    let bound: Vec<String> = instance
        .application_names
        .iter()
        .filter(|name| app_names.contains(name))
        .cloned()
        .collect();
    (!bound.is_empty()).then_some(bound)
}

/// Classifies one source instance.
///
/// Only a plan-less instance that also appears in the user-provided summary is
/// a passthrough; everything else is treated as managed, even when a
/// user-provided service of the same name exists.
pub fn classify<'a>(
    instance: &ServiceInstance,
    user_provided: &'a [UserProvidedService],
    policy: &CopyPolicy,
) -> Classification<'a> {
    if instance.is_plan_less()
        && let Some(ups) = user_provided.iter().find(|u| u.name == instance.name)
    {
        return Classification::Passthrough(ups);
    }

    if policy.wants_bridge(instance) {
        Classification::CredentialBridge
    } else {
        Classification::ManagedClone
    }
}
