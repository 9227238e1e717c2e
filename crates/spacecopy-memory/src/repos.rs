//! Repository trait implementations for [`InMemorySpace`].

use async_trait::async_trait;
use serde_json::Value;
use spacecopy_api::{
    ApiError, ApplicationRepository, Credentials, OrganizationFields, Params,
    ServiceBindingRepository, ServiceInstance, ServiceKey, ServiceKeyRepository,
    ServiceOfferingFields, ServicePlanFields, ServicePlanRepository, ServiceRepository,
    ServiceSummaryRepository, SpaceFields, SpaceSession, UserProvidedService,
    UserProvidedServiceRepository,
};

use crate::space::{InMemorySpace, OperationKind, RecordedOperation, StoredBinding, new_guid};

#[async_trait]
impl ServiceSummaryRepository for InMemorySpace {
    async fn summaries_in_current_space(&self) -> Result<Vec<ServiceInstance>, ApiError> {
        let state = self.state.read().await;
        state.check_fault(OperationKind::ListServiceSummaries)?;

        // Summaries only carry identity and bound application names.
        Ok(state
            .instances
            .keys()
            .filter_map(|guid| state.assemble(guid))
            .map(|instance| ServiceInstance {
                guid: instance.guid,
                name: instance.name,
                application_names: instance.application_names,
                ..Default::default()
            })
            .collect())
    }
}

#[async_trait]
impl ServiceRepository for InMemorySpace {
    async fn find_instance_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ServiceInstance>, ApiError> {
        let state = self.state.read().await;
        state.check_fault(OperationKind::FindServiceInstance)?;
        Ok(state
            .instance_guid_by_name(name)
            .and_then(|guid| state.assemble(&guid)))
    }

    async fn create_service_instance(
        &self,
        name: &str,
        plan_guid: &str,
        params: &Params,
        tags: &[String],
    ) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state.check_fault(OperationKind::CreateServiceInstance)?;

        if state.instance_guid_by_name(name).is_some() {
            return Err(ApiError::already_exists("service instance", name));
        }
        let (offering_guid, plan) = state
            .plans
            .get(plan_guid)
            .cloned()
            .ok_or_else(|| ApiError::not_found("service plan", plan_guid))?;
        let offering = state
            .offerings
            .get(&offering_guid)
            .cloned()
            .ok_or_else(|| ApiError::not_found("service offering", &offering_guid))?;

        let guid = new_guid();
        state.instances.insert(
            guid.clone(),
            ServiceInstance {
                guid,
                name: name.to_string(),
                params: params.clone(),
                tags: tags.to_vec(),
                service_plan: plan,
                service_offering: offering,
                ..Default::default()
            },
        );
        state.journal.push(RecordedOperation::CreateServiceInstance {
            name: name.to_string(),
            plan_guid: plan_guid.to_string(),
        });
        Ok(())
    }

    async fn delete_service(&self, instance: &ServiceInstance) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state.check_fault(OperationKind::DeleteServiceInstance)?;

        let Some(stored) = state.instances.get(&instance.guid).cloned() else {
            return Err(ApiError::not_found("service instance", &instance.guid));
        };
        let guid = stored.guid.as_str();
        if state.bindings.values().any(|b| b.instance_guid == guid) {
            return Err(ApiError::invalid_request(format!(
                "service instance {} still has bindings",
                stored.name
            )));
        }
        if state.keys.values().any(|k| k.service_instance_guid == guid) {
            return Err(ApiError::invalid_request(format!(
                "service instance {} still has service keys",
                stored.name
            )));
        }

        state.instances.shift_remove(guid);
        let space_guid = self.space.guid.clone();
        state
            .user_provided
            .retain(|u| !(u.name == stored.name && u.space_guid == space_guid));
        state.journal.push(RecordedOperation::DeleteServiceInstance {
            guid: stored.guid.clone(),
            name: stored.name.clone(),
        });
        Ok(())
    }

    async fn find_service_offerings_for_space_by_label(
        &self,
        space_guid: &str,
        label: &str,
    ) -> Result<Vec<ServiceOfferingFields>, ApiError> {
        let state = self.state.read().await;
        state.check_fault(OperationKind::FindServiceOfferings)?;

        if space_guid != self.space.guid {
            return Err(ApiError::invalid_request(format!(
                "space {space_guid} is not visible to this session"
            )));
        }
        Ok(state
            .offerings
            .values()
            .filter(|o| o.label == label)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ServicePlanRepository for InMemorySpace {
    async fn search_by_offering(
        &self,
        offering_guid: &str,
    ) -> Result<Vec<ServicePlanFields>, ApiError> {
        let state = self.state.read().await;
        state.check_fault(OperationKind::SearchServicePlans)?;
        Ok(state
            .plans
            .values()
            .filter(|(guid, _)| guid == offering_guid)
            .map(|(_, plan)| plan.clone())
            .collect())
    }
}

#[async_trait]
impl UserProvidedServiceRepository for InMemorySpace {
    async fn summaries(&self) -> Result<Vec<UserProvidedService>, ApiError> {
        let state = self.state.read().await;
        state.check_fault(OperationKind::ListUserProvidedServices)?;
        Ok(state.user_provided.clone())
    }

    async fn create(
        &self,
        name: &str,
        syslog_drain_url: &str,
        route_service_url: &str,
        credentials: &Credentials,
    ) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state.check_fault(OperationKind::CreateUserProvidedService)?;

        if state.instance_guid_by_name(name).is_some() {
            return Err(ApiError::already_exists("service instance", name));
        }

        state.user_provided.push(UserProvidedService {
            name: name.to_string(),
            credentials: credentials.clone(),
            space_guid: self.space.guid.clone(),
            syslog_drain_url: syslog_drain_url.to_string(),
            route_service_url: route_service_url.to_string(),
        });
        let guid = new_guid();
        state.instances.insert(
            guid.clone(),
            ServiceInstance {
                guid,
                name: name.to_string(),
                ..Default::default()
            },
        );
        state.journal.push(RecordedOperation::CreateUserProvidedService {
            name: name.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl ServiceKeyRepository for InMemorySpace {
    async fn create_service_key(
        &self,
        instance_guid: &str,
        key_name: &str,
        _params: &Params,
    ) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state.check_fault(OperationKind::CreateServiceKey)?;

        let instance = state
            .instances
            .get(instance_guid)
            .cloned()
            .ok_or_else(|| ApiError::not_found("service instance", instance_guid))?;
        if instance.is_plan_less() && state.user_provided.iter().any(|u| u.name == instance.name) {
            return Err(ApiError::invalid_request(format!(
                "service keys are not supported for user-provided service {}",
                instance.name
            )));
        }
        if state
            .keys
            .values()
            .any(|k| k.service_instance_guid == instance_guid && k.name == key_name)
        {
            return Err(ApiError::already_exists("service key", key_name));
        }

        let guid = new_guid();
        let mut credentials = Credentials::new();
        credentials.insert("service_instance".into(), Value::String(instance.name.clone()));
        credentials.insert("key_name".into(), Value::String(key_name.to_string()));
        credentials.insert("secret".into(), Value::String(new_guid()));

        state.keys.insert(
            guid.clone(),
            ServiceKey {
                guid,
                name: key_name.to_string(),
                service_instance_guid: instance_guid.to_string(),
                credentials,
            },
        );
        state.journal.push(RecordedOperation::CreateServiceKey {
            instance_guid: instance_guid.to_string(),
            name: key_name.to_string(),
        });
        Ok(())
    }

    async fn get_service_key(
        &self,
        instance_guid: &str,
        key_name: &str,
    ) -> Result<Option<ServiceKey>, ApiError> {
        let state = self.state.read().await;
        state.check_fault(OperationKind::GetServiceKey)?;
        Ok(state
            .keys
            .values()
            .find(|k| k.service_instance_guid == instance_guid && k.name == key_name)
            .cloned())
    }

    async fn delete_service_key(&self, key_guid: &str) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state.check_fault(OperationKind::DeleteServiceKey)?;

        if state.keys.shift_remove(key_guid).is_none() {
            return Err(ApiError::not_found("service key", key_guid));
        }
        state.journal.push(RecordedOperation::DeleteServiceKey {
            guid: key_guid.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl ServiceBindingRepository for InMemorySpace {
    async fn create(
        &self,
        instance_guid: &str,
        app_guid: &str,
        _params: &Params,
    ) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state.check_fault(OperationKind::CreateServiceBinding)?;

        if !state.instances.contains_key(instance_guid) {
            return Err(ApiError::not_found("service instance", instance_guid));
        }
        if !state.applications.contains_key(app_guid) {
            return Err(ApiError::not_found("application", app_guid));
        }
        if state
            .bindings
            .values()
            .any(|b| b.instance_guid == instance_guid && b.app_guid == app_guid)
        {
            return Err(ApiError::already_exists(
                "service binding",
                format!("{instance_guid}/{app_guid}"),
            ));
        }

        let guid = new_guid();
        state.bindings.insert(
            guid.clone(),
            StoredBinding {
                guid,
                instance_guid: instance_guid.to_string(),
                app_guid: app_guid.to_string(),
            },
        );
        state.journal.push(RecordedOperation::CreateServiceBinding {
            instance_guid: instance_guid.to_string(),
            app_guid: app_guid.to_string(),
        });
        Ok(())
    }

    async fn delete(&self, instance: &ServiceInstance, app_guid: &str) -> Result<bool, ApiError> {
        let mut state = self.state.write().await;
        state.check_fault(OperationKind::DeleteServiceBinding)?;

        let found = state
            .bindings
            .values()
            .find(|b| b.instance_guid == instance.guid && b.app_guid == app_guid)
            .map(|b| b.guid.clone());
        let Some(binding_guid) = found else {
            return Ok(false);
        };

        state.bindings.shift_remove(&binding_guid);
        state.journal.push(RecordedOperation::DeleteServiceBinding {
            instance_guid: instance.guid.clone(),
            app_guid: app_guid.to_string(),
        });
        Ok(true)
    }
}

#[async_trait]
impl ApplicationRepository for InMemorySpace {
    async fn create_restage_request(&self, app_guid: &str) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state.check_fault(OperationKind::RestageApplication)?;

        if !state.applications.contains_key(app_guid) {
            return Err(ApiError::not_found("application", app_guid));
        }
        state.journal.push(RecordedOperation::RestageApplication {
            app_guid: app_guid.to_string(),
        });
        Ok(())
    }
}

impl SpaceSession for InMemorySpace {
    fn org(&self) -> OrganizationFields {
        self.org.clone()
    }

    fn space(&self) -> SpaceFields {
        self.space.clone()
    }

    fn service_summary(&self) -> &dyn ServiceSummaryRepository {
        self
    }

    fn services(&self) -> &dyn ServiceRepository {
        self
    }

    fn service_plans(&self) -> &dyn ServicePlanRepository {
        self
    }

    fn user_provided_services(&self) -> &dyn UserProvidedServiceRepository {
        self
    }

    fn service_keys(&self) -> &dyn ServiceKeyRepository {
        self
    }

    fn service_bindings(&self) -> &dyn ServiceBindingRepository {
        self
    }

    fn applications(&self) -> &dyn ApplicationRepository {
        self
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpaceFixture;

    fn space() -> InMemorySpace {
        InMemorySpace::from_fixture(
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
            .with_offering(
                "svc-offering-2001",
                "RabbitMQ",
                &[("plan-2003", "Small"), ("plan-2004", "Medium")],
            ),
        )
    }

    fn as_session(space: &InMemorySpace) -> &dyn SpaceSession {
        space
    }

    #[tokio::test]
    async fn test_create_and_find_managed_instance() {
        let space = space();
        let session = as_session(&space);
        let tags = vec!["queue".to_string()];

        session
            .services()
            .create_service_instance("svc3", "plan-2003", &Params::new(), &tags)
            .await
            .unwrap();

        let svc3 = session
            .services()
            .find_instance_by_name("svc3")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(svc3.service_plan.name, "Small");
        assert_eq!(svc3.service_offering.label, "RabbitMQ");
        assert_eq!(svc3.tags, tags);
        assert!(!svc3.is_plan_less());
    }

    #[tokio::test]
    async fn test_create_with_unknown_plan_fails() {
        let space = space();
        let err = as_session(&space)
            .services()
            .create_service_instance("svc3", "no-such-plan", &Params::new(), &[])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_user_provided_service_registers_instance() {
        let space = space();
        let session = as_session(&space);
        let mut credentials = Credentials::new();
        credentials.insert("uri".into(), Value::String("amqp://host".into()));

        session
            .user_provided_services()
            .create("svc3", "", "", &credentials)
            .await
            .unwrap();

        let instance = space.instance_named("svc3").await.unwrap();
        assert!(instance.is_plan_less());
        let ups = space.user_provided_named("svc3").await.unwrap();
        assert_eq!(ups.credentials, credentials);
        assert_eq!(ups.space_guid, "space-2000");

        session.services().delete_service(&instance).await.unwrap();
        assert!(space.user_provided_named("svc3").await.is_none());
    }

    #[tokio::test]
    async fn test_delete_refuses_bound_instance() {
        let space = space();
        let session = as_session(&space);
        session
            .services()
            .create_service_instance("svc3", "plan-2003", &Params::new(), &[])
            .await
            .unwrap();
        let svc3 = space.instance_named("svc3").await.unwrap();
        session
            .service_bindings()
            .create(&svc3.guid, "app-2000", &Params::new())
            .await
            .unwrap();

        let err = session.services().delete_service(&svc3).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest { .. }));

        assert!(session.service_bindings().delete(&svc3, "app-2000").await.unwrap());
        assert!(!session.service_bindings().delete(&svc3, "app-2000").await.unwrap());
        session.services().delete_service(&svc3).await.unwrap();
    }

    #[tokio::test]
    async fn test_service_key_lifecycle() {
        let space = space();
        let session = as_session(&space);
        session
            .services()
            .create_service_instance("svc3", "plan-2003", &Params::new(), &[])
            .await
            .unwrap();
        let svc3 = space.instance_named("svc3").await.unwrap();
        let keys = session.service_keys();

        keys.create_service_key(&svc3.guid, "bridge", &Params::new())
            .await
            .unwrap();
        let err = keys
            .create_service_key(&svc3.guid, "bridge", &Params::new())
            .await
            .unwrap_err();
        assert!(err.is_already_exists());

        let key = keys.get_service_key(&svc3.guid, "bridge").await.unwrap().unwrap();
        assert_eq!(key.credentials["service_instance"], "svc3");

        keys.delete_service_key(&key.guid).await.unwrap();
        assert!(keys.get_service_key(&svc3.guid, "bridge").await.unwrap().is_none());
        assert!(keys.delete_service_key(&key.guid).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_offering_lookup_is_scoped_to_space() {
        let space = space();
        let services = as_session(&space).services();

        let offerings = services
            .find_service_offerings_for_space_by_label("space-2000", "RabbitMQ")
            .await
            .unwrap();
        assert_eq!(offerings.len(), 1);
        assert!(
            services
                .find_service_offerings_for_space_by_label("space-2000", "Redis")
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            services
                .find_service_offerings_for_space_by_label("space-9999", "RabbitMQ")
                .await
                .is_err()
        );

        let plans = as_session(&space)
            .service_plans()
            .search_by_offering("svc-offering-2001")
            .await
            .unwrap();
        assert_eq!(plans.len(), 2);
    }

    #[tokio::test]
    async fn test_restage_is_journaled_and_faults_apply() {
        let space = space();
        let apps = as_session(&space).applications();

        apps.create_restage_request("app-2000").await.unwrap();
        assert!(apps.create_restage_request("app-9999").await.unwrap_err().is_not_found());
        assert_eq!(space.restage_requests().await, vec!["app-2000".to_string()]);

        space.fail_on(OperationKind::RestageApplication).await;
        let err = apps.create_restage_request("app-2000").await.unwrap_err();
        assert_eq!(err.category(), spacecopy_api::ErrorCategory::Infrastructure);

        space.clear_faults().await;
        apps.create_restage_request("app-2000").await.unwrap();
        assert_eq!(space.operations().await.len(), 2);
    }
}
