//! Control-plane models shared by every collaborator.
//!
//! The shapes follow what a control plane returns for a space: summaries carry
//! only names and bound application names, while a detail lookup fills in the
//! plan, offering, keys and bindings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Credential mapping carried by user-provided services and service keys.
pub type Credentials = Map<String, Value>;

/// Arbitrary parameters passed when provisioning or binding.
pub type Params = Map<String, Value>;

/// Identity of an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationFields {
    pub guid: String,
    pub name: String,
}

/// Identity of a space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceFields {
    pub guid: String,
    pub name: String,
}

/// Identity of an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFields {
    pub guid: String,
    pub name: String,
}

/// A service offering (the catalog entry a managed service is provisioned from).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOfferingFields {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub label: String,
}

/// A plan within a service offering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePlanFields {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub name: String,
}

/// Reference to a service key as listed on its instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceKeyFields {
    pub guid: String,
    pub name: String,
}

/// A service key together with the credentials it exposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceKey {
    pub guid: String,
    pub name: String,
    pub service_instance_guid: String,
    #[serde(default)]
    pub credentials: Credentials,
}

impl ServiceKey {
    /// Returns the reference form used in instance key listings.
    pub fn fields(&self) -> ServiceKeyFields {
        ServiceKeyFields {
            guid: self.guid.clone(),
            name: self.name.clone(),
        }
    }
}

/// Reference to a binding between an instance and an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBindingFields {
    pub guid: String,
    pub app_guid: String,
}

/// A provisioned service instance, managed or user-provided.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub application_names: Vec<String>,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub service_plan: ServicePlanFields,
    #[serde(default)]
    pub service_offering: ServiceOfferingFields,
    #[serde(default)]
    pub service_keys: Vec<ServiceKeyFields>,
    #[serde(default)]
    pub service_bindings: Vec<ServiceBindingFields>,
}

impl ServiceInstance {
    /// Returns `true` when the instance carries neither a plan nor an offering
    /// GUID, which is how user-provided services appear in instance listings.
    pub fn is_plan_less(&self) -> bool {
        self.service_plan.guid.is_empty() && self.service_offering.guid.is_empty()
    }
}

/// A user-provided service: a named credential record with no plan or offering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProvidedService {
    pub name: String,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub space_guid: String,
    #[serde(default)]
    pub syslog_drain_url: String,
    #[serde(default)]
    pub route_service_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_less_instance() {
        let ups = ServiceInstance {
            guid: "svc-1003".into(),
            name: "ups1".into(),
            ..Default::default()
        };
        assert!(ups.is_plan_less());

        let managed = ServiceInstance {
            service_plan: ServicePlanFields {
                guid: "plan-1".into(),
                name: "Small".into(),
            },
            ..ups.clone()
        };
        assert!(!managed.is_plan_less());
    }

    #[test]
    fn test_instance_deserializes_with_defaults() {
        let json = serde_json::json!({
            "guid": "svc-1002",
            "name": "svc3",
            "application_names": ["app2"],
            "service_plan": {"name": "Small"},
            "service_offering": {"label": "RabbitMQ"}
        });
        let instance: ServiceInstance = serde_json::from_value(json).unwrap();
        assert_eq!(instance.service_plan.name, "Small");
        assert_eq!(instance.service_offering.label, "RabbitMQ");
        assert!(instance.service_keys.is_empty());
        assert!(instance.is_plan_less());
    }
}
