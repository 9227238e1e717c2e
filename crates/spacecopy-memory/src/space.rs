use std::collections::HashSet;

use indexmap::IndexMap;
use spacecopy_api::{
    ApiError, ApplicationFields, OrganizationFields, ServiceBindingFields, ServiceInstance,
    ServiceKey, ServiceOfferingFields, ServicePlanFields, SpaceFields, UserProvidedService,
};
use tokio::sync::RwLock;
use tracing::debug;

use crate::fixture::{OfferingFixture, SpaceFixture};

/// Kinds of calls a space can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    ListServiceSummaries,
    ListUserProvidedServices,
    FindServiceInstance,
    FindServiceOfferings,
    SearchServicePlans,
    CreateServiceInstance,
    CreateUserProvidedService,
    DeleteServiceInstance,
    CreateServiceKey,
    GetServiceKey,
    DeleteServiceKey,
    CreateServiceBinding,
    DeleteServiceBinding,
    RestageApplication,
}

/// A mutating call that was applied to the space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedOperation {
    CreateServiceInstance { name: String, plan_guid: String },
    CreateUserProvidedService { name: String },
    DeleteServiceInstance { guid: String, name: String },
    CreateServiceKey { instance_guid: String, name: String },
    DeleteServiceKey { guid: String },
    CreateServiceBinding { instance_guid: String, app_guid: String },
    DeleteServiceBinding { instance_guid: String, app_guid: String },
    RestageApplication { app_guid: String },
}

impl RecordedOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::CreateServiceInstance { .. } => OperationKind::CreateServiceInstance,
            Self::CreateUserProvidedService { .. } => OperationKind::CreateUserProvidedService,
            Self::DeleteServiceInstance { .. } => OperationKind::DeleteServiceInstance,
            Self::CreateServiceKey { .. } => OperationKind::CreateServiceKey,
            Self::DeleteServiceKey { .. } => OperationKind::DeleteServiceKey,
            Self::CreateServiceBinding { .. } => OperationKind::CreateServiceBinding,
            Self::DeleteServiceBinding { .. } => OperationKind::DeleteServiceBinding,
            Self::RestageApplication { .. } => OperationKind::RestageApplication,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct StoredBinding {
    pub(crate) guid: String,
    pub(crate) instance_guid: String,
    pub(crate) app_guid: String,
}

#[derive(Debug, Default)]
pub(crate) struct SpaceState {
    pub(crate) applications: IndexMap<String, ApplicationFields>,
    pub(crate) offerings: IndexMap<String, ServiceOfferingFields>,
    /// plan guid -> (offering guid, plan)
    pub(crate) plans: IndexMap<String, (String, ServicePlanFields)>,
    /// Instances keyed by GUID; key and binding lists are kept empty here and
    /// assembled from `keys` and `bindings` on read.
    pub(crate) instances: IndexMap<String, ServiceInstance>,
    pub(crate) keys: IndexMap<String, ServiceKey>,
    pub(crate) bindings: IndexMap<String, StoredBinding>,
    pub(crate) user_provided: Vec<UserProvidedService>,
    pub(crate) journal: Vec<RecordedOperation>,
    pub(crate) faults: HashSet<OperationKind>,
}

impl SpaceState {
    pub(crate) fn check_fault(&self, kind: OperationKind) -> Result<(), ApiError> {
        if self.faults.contains(&kind) {
            return Err(ApiError::transport(format!("injected failure for {kind:?}")));
        }
        Ok(())
    }

    pub(crate) fn instance_guid_by_name(&self, name: &str) -> Option<String> {
        self.instances
            .values()
            .find(|i| i.name == name)
            .map(|i| i.guid.clone())
    }

    /// Returns the instance with its keys, bindings and bound application names filled in.
    pub(crate) fn assemble(&self, guid: &str) -> Option<ServiceInstance> {
        let mut instance = self.instances.get(guid)?.clone();
        instance.service_keys = self
            .keys
            .values()
            .filter(|k| k.service_instance_guid == guid)
            .map(ServiceKey::fields)
            .collect();
        instance.service_bindings = self
            .bindings
            .values()
            .filter(|b| b.instance_guid == guid)
            .map(|b| ServiceBindingFields {
                guid: b.guid.clone(),
                app_guid: b.app_guid.clone(),
            })
            .collect();
        for binding in &instance.service_bindings {
            if let Some(app) = self.applications.get(&binding.app_guid)
                && !instance.application_names.contains(&app.name)
            {
                instance.application_names.push(app.name.clone());
            }
        }
        Some(instance)
    }
}

pub(crate) fn new_guid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// An in-memory space that behaves like a control plane for one org/space.
///
/// Every instance is built explicitly from a [`SpaceFixture`], so tests never
/// share state. Mutating calls are journaled and individual call kinds can be
/// made to fail with [`InMemorySpace::fail_on`].
#[derive(Debug)]
pub struct InMemorySpace {
    pub(crate) org: OrganizationFields,
    pub(crate) space: SpaceFields,
    pub(crate) state: RwLock<SpaceState>,
}

impl InMemorySpace {
    /// Creates an empty space.
    pub fn new(org: OrganizationFields, space: SpaceFields) -> Self {
        Self::from_fixture(SpaceFixture::new(org, space))
    }

    /// Creates a space seeded with the contents of a fixture.
    pub fn from_fixture(fixture: SpaceFixture) -> Self {
        let mut state = SpaceState::default();

        for app in fixture.applications {
            state.applications.insert(app.guid.clone(), app);
        }
        for OfferingFixture { offering, plans } in fixture.offerings {
            for plan in plans {
                state
                    .plans
                    .insert(plan.guid.clone(), (offering.guid.clone(), plan));
            }
            state.offerings.insert(offering.guid.clone(), offering);
        }
        for key in fixture.service_keys {
            state.keys.insert(key.guid.clone(), key);
        }
        for mut instance in fixture.service_instances {
            if instance.guid.is_empty() {
                instance.guid = new_guid();
            }
            for key in std::mem::take(&mut instance.service_keys) {
                state.keys.entry(key.guid.clone()).or_insert(ServiceKey {
                    guid: key.guid,
                    name: key.name,
                    service_instance_guid: instance.guid.clone(),
                    credentials: Default::default(),
                });
            }
            for binding in std::mem::take(&mut instance.service_bindings) {
                state.bindings.insert(
                    binding.guid.clone(),
                    StoredBinding {
                        guid: binding.guid,
                        instance_guid: instance.guid.clone(),
                        app_guid: binding.app_guid,
                    },
                );
            }
            state.instances.insert(instance.guid.clone(), instance);
        }
        state.user_provided = fixture.user_provided_services;

        debug!(
            space = %fixture.space.name,
            instances = state.instances.len(),
            keys = state.keys.len(),
            bindings = state.bindings.len(),
            "Seeded in-memory space"
        );

        Self {
            org: fixture.org,
            space: fixture.space,
            state: RwLock::new(state),
        }
    }

    /// Exports the current contents as a fixture.
    pub async fn snapshot(&self) -> SpaceFixture {
        let state = self.state.read().await;
        let offerings = state
            .offerings
            .values()
            .map(|offering| OfferingFixture {
                offering: offering.clone(),
                plans: state
                    .plans
                    .values()
                    .filter(|(offering_guid, _)| *offering_guid == offering.guid)
                    .map(|(_, plan)| plan.clone())
                    .collect(),
            })
            .collect();

        SpaceFixture {
            org: self.org.clone(),
            space: self.space.clone(),
            applications: state.applications.values().cloned().collect(),
            offerings,
            service_instances: state
                .instances
                .keys()
                .filter_map(|guid| state.assemble(guid))
                .collect(),
            service_keys: state.keys.values().cloned().collect(),
            user_provided_services: state.user_provided.clone(),
        }
    }

    /// Makes every subsequent call of the given kind fail with a transport error.
    pub async fn fail_on(&self, kind: OperationKind) {
        self.state.write().await.faults.insert(kind);
    }

    pub async fn clear_faults(&self) {
        self.state.write().await.faults.clear();
    }

    /// Returns the mutating calls applied so far, in order.
    pub async fn operations(&self) -> Vec<RecordedOperation> {
        self.state.read().await.journal.clone()
    }

    /// Returns the application GUIDs restaged so far, in order.
    pub async fn restage_requests(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .journal
            .iter()
            .filter_map(|op| match op {
                RecordedOperation::RestageApplication { app_guid } => Some(app_guid.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn instance_named(&self, name: &str) -> Option<ServiceInstance> {
        let state = self.state.read().await;
        let guid = state.instance_guid_by_name(name)?;
        state.assemble(&guid)
    }

    pub async fn instance_names(&self) -> Vec<String> {
        let state = self.state.read().await;
        state.instances.values().map(|i| i.name.clone()).collect()
    }

    /// Returns the user-provided service record with the given name in this space.
    pub async fn user_provided_named(&self, name: &str) -> Option<UserProvidedService> {
        let state = self.state.read().await;
        state
            .user_provided
            .iter()
            .find(|u| u.name == name && u.space_guid == self.space.guid)
            .cloned()
    }

    /// Returns the keys of an instance, with credentials.
    pub async fn service_keys_of(&self, instance_guid: &str) -> Vec<ServiceKey> {
        let state = self.state.read().await;
        state
            .keys
            .values()
            .filter(|k| k.service_instance_guid == instance_guid)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> SpaceFixture {
        SpaceFixture::new(
            OrganizationFields {
                guid: "org-2".into(),
                name: "destOrg".into(),
            },
            SpaceFields {
                guid: "space-2000".into(),
                name: "destSpace".into(),
            },
        )
        .with_application("app-2000", "app1")
        .with_application("app-2001", "app2")
        .with_instance(ServiceInstance {
            guid: "svc-2000".into(),
            name: "svc3".into(),
            service_keys: vec![spacecopy_api::ServiceKeyFields {
                guid: "svc-key-2000".into(),
                name: "some-svc-key-for-svc3".into(),
            }],
            service_bindings: vec![ServiceBindingFields {
                guid: "svc-bnd-2000".into(),
                app_guid: "app-2001".into(),
            }],
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_inline_keys_and_bindings_are_seeded() {
        let space = InMemorySpace::from_fixture(fixture());
        let svc3 = space.instance_named("svc3").await.unwrap();

        assert_eq!(svc3.service_keys.len(), 1);
        assert_eq!(svc3.service_keys[0].name, "some-svc-key-for-svc3");
        assert_eq!(svc3.service_bindings[0].app_guid, "app-2001");
        assert_eq!(svc3.application_names, vec!["app2".to_string()]);
        assert!(space.service_keys_of("svc-2000").await[0].credentials.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_reimports_to_same_state() {
        let space = InMemorySpace::from_fixture(fixture());
        let snapshot = space.snapshot().await;
        let again = InMemorySpace::from_fixture(snapshot.clone());

        assert_eq!(again.snapshot().await, snapshot);
    }

    #[tokio::test]
    async fn test_faults_are_checked_per_kind() {
        let space = InMemorySpace::from_fixture(fixture());
        space.fail_on(OperationKind::RestageApplication).await;

        let state = space.state.read().await;
        assert!(state.check_fault(OperationKind::RestageApplication).is_err());
        assert!(state.check_fault(OperationKind::CreateServiceKey).is_ok());
    }
}
