//! The result of selecting services to copy, filled in by the reconciler.

use std::fmt;

use spacecopy_api::{ServiceInstance, UserProvidedService};

use crate::registry::{BindingRegistry, ServiceOutcome};

/// How a selected service is created at the destination.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyStrategy {
    /// A source user-provided service, copied with its credentials.
    UserProvided(UserProvidedService),
    /// A managed service copied as a user-provided service whose credentials
    /// come from a source service key.
    CredentialBridge(UserProvidedService),
    /// A managed service provisioned from the same offering label and plan name.
    ManagedClone {
        offering_label: String,
        plan_name: String,
    },
}

impl CopyStrategy {
    /// The user-provided service to create, for both passthrough and bridged copies.
    pub fn user_provided(&self) -> Option<&UserProvidedService> {
        match self {
            Self::UserProvided(ups) | Self::CredentialBridge(ups) => Some(ups),
            Self::ManagedClone { .. } => None,
        }
    }
}

impl fmt::Display for CopyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserProvided(_) => write!(f, "user-provided"),
            Self::CredentialBridge(_) => write!(f, "credential-bridge"),
            Self::ManagedClone {
                offering_label,
                plan_name,
            } => write!(f, "managed ({offering_label}/{plan_name})"),
        }
    }
}

/// One source service selected for copying.
#[derive(Debug, Clone)]
pub struct PlannedService {
    pub(crate) instance: ServiceInstance,
    pub(crate) strategy: CopyStrategy,
}

impl PlannedService {
    pub fn name(&self) -> &str {
        &self.instance.name
    }

    /// Requested application names bound to the source instance.
    pub fn application_names(&self) -> &[String] {
        &self.instance.application_names
    }

    pub fn strategy(&self) -> &CopyStrategy {
        &self.strategy
    }

    /// The source instance, with application names narrowed to the request.
    pub fn source(&self) -> &ServiceInstance {
        &self.instance
    }
}

/// Services selected from the source, and after a copy, their destination
/// counterparts.
#[derive(Debug, Clone, Default)]
pub struct ServiceCollection {
    pub(crate) planned: Vec<PlannedService>,
    pub(crate) registry: BindingRegistry,
}

impl ServiceCollection {
    /// Returns the destination instance GUIDs an application should be bound
    /// to, or `None` if the application is bound to no copied service.
    pub fn app_bindings(&self, app_name: &str) -> Option<&[String]> {
        self.registry.app_bindings(app_name)
    }

    /// Selected services in copy order.
    pub fn planned(&self) -> &[PlannedService] {
        &self.planned
    }

    /// User-provided services to create at the destination, passthrough and
    /// bridged alike.
    pub fn user_provided_services(&self) -> impl Iterator<Item = &UserProvidedService> {
        self.planned
            .iter()
            .filter_map(|p| p.strategy.user_provided())
    }

    /// How a service was reconciled, once copied.
    pub fn outcome(&self, service_name: &str) -> Option<ServiceOutcome> {
        self.registry.outcome(service_name)
    }

    /// The destination instance of a service, once copied.
    pub fn destination_instance(&self, service_name: &str) -> Option<&ServiceInstance> {
        self.registry.instance(service_name)
    }

    pub fn len(&self) -> usize {
        self.planned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planned.is_empty()
    }
}
