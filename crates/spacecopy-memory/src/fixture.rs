//! Serializable description of a space, used to seed and export [`InMemorySpace`].
//!
//! [`InMemorySpace`]: crate::InMemorySpace

use std::path::Path;

use serde::{Deserialize, Serialize};
use spacecopy_api::{
    ApplicationFields, OrganizationFields, ServiceInstance, ServiceKey, ServiceOfferingFields,
    ServicePlanFields, SpaceFields, UserProvidedService,
};

/// Errors raised while reading or writing fixture files.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixture {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A service offering together with its plans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferingFixture {
    #[serde(flatten)]
    pub offering: ServiceOfferingFields,
    #[serde(default)]
    pub plans: Vec<ServicePlanFields>,
}

/// Full contents of one space.
///
/// Instance entries may list their bindings inline; keys listed inline on an
/// instance but absent from `service_keys` are seeded with empty credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceFixture {
    pub org: OrganizationFields,
    pub space: SpaceFields,
    #[serde(default)]
    pub applications: Vec<ApplicationFields>,
    #[serde(default)]
    pub offerings: Vec<OfferingFixture>,
    #[serde(default)]
    pub service_instances: Vec<ServiceInstance>,
    #[serde(default)]
    pub service_keys: Vec<ServiceKey>,
    #[serde(default)]
    pub user_provided_services: Vec<UserProvidedService>,
}

impl SpaceFixture {
    pub fn new(org: OrganizationFields, space: SpaceFields) -> Self {
        Self {
            org,
            space,
            ..Default::default()
        }
    }

    pub fn with_application(mut self, guid: &str, name: &str) -> Self {
        self.applications.push(ApplicationFields {
            guid: guid.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Adds an offering and its plans, given as `(guid, name)` pairs.
    pub fn with_offering(mut self, guid: &str, label: &str, plans: &[(&str, &str)]) -> Self {
        self.offerings.push(OfferingFixture {
            offering: ServiceOfferingFields {
                guid: guid.to_string(),
                label: label.to_string(),
            },
            plans: plans
                .iter()
                .map(|(guid, name)| ServicePlanFields {
                    guid: (*guid).to_string(),
                    name: (*name).to_string(),
                })
                .collect(),
        });
        self
    }

    pub fn with_instance(mut self, instance: ServiceInstance) -> Self {
        self.service_instances.push(instance);
        self
    }

    pub fn with_service_key(mut self, key: ServiceKey) -> Self {
        self.service_keys.push(key);
        self
    }

    pub fn with_user_provided(mut self, ups: UserProvidedService) -> Self {
        self.user_provided_services.push(ups);
        self
    }

    /// Reads a fixture from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| FixtureError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Writes the fixture as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FixtureError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self).map_err(|source| FixtureError::Json {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, content).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> SpaceFixture {
        SpaceFixture::new(
            OrganizationFields {
                guid: "org-1".into(),
                name: "destOrg".into(),
            },
            SpaceFields {
                guid: "space-2000".into(),
                name: "destSpace".into(),
            },
        )
        .with_application("app-2000", "app1")
        .with_offering("svc-offering-2001", "RabbitMQ", &[("plan-2003", "Small")])
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("space.json");

        fixture().save(&path).unwrap();
        let loaded = SpaceFixture::load(&path).unwrap();

        assert_eq!(loaded, fixture());
        assert_eq!(loaded.offerings[0].plans[0].name, "Small");
    }

    #[test]
    fn test_offering_is_flattened() {
        let value = serde_json::to_value(&fixture()).unwrap();
        assert_eq!(value["offerings"][0]["label"], "RabbitMQ");
        assert_eq!(value["offerings"][0]["plans"][0]["guid"], "plan-2003");
    }

    #[test]
    fn test_load_missing_file() {
        let err = SpaceFixture::load("/nonexistent/space.json").unwrap_err();
        assert!(matches!(err, FixtureError::Io { .. }));
    }
}
