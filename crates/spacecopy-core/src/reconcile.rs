//! Brings the destination space in line with the selected services.
//!
//! Per service: reuse a same-named instance, or (with `recreate`) unbind,
//! strip and delete it before creating a fresh one. The first failure aborts;
//! nothing is rolled back, and a rerun without `recreate` reuses whatever was
//! already created.

use spacecopy_api::{Params, ServiceInstance, SpaceSession};
use tracing::{debug, info, warn};

use crate::collection::{CopyStrategy, PlannedService};
use crate::error::CopyError;
use crate::registry::{BindingRegistry, ServiceOutcome};

/// Reconciles planned services against the destination session.
pub struct Reconciler<'a> {
    destination: &'a dyn SpaceSession,
}

impl<'a> Reconciler<'a> {
    pub fn new(destination: &'a dyn SpaceSession) -> Self {
        Self { destination }
    }

    /// Reconciles one service and records its destination instance and
    /// expected application bindings.
    pub async fn reconcile(
        &self,
        planned: &PlannedService,
        recreate: bool,
        registry: &mut BindingRegistry,
    ) -> Result<ServiceOutcome, CopyError> {
        let name = planned.name();
        let existing = self
            .destination
            .services()
            .find_instance_by_name(name)
            .await?;

        let mut rebind_app_guids = Vec::new();
        let outcome = match existing {
            Some(_) if !recreate => {
                info!(service = %name, "+ existing service {name} will be reused");
                ServiceOutcome::Reused
            }
            Some(existing) => {
                debug!(
                    service = %name,
                    guid = %existing.guid,
                    "Found service instance having the same name as service to be copied"
                );
                rebind_app_guids = self.tear_down(&existing).await?;
                self.create(planned).await?;
                ServiceOutcome::Recreated
            }
            None => {
                self.create(planned).await?;
                ServiceOutcome::Created
            }
        };

        let instance = self
            .destination
            .services()
            .find_instance_by_name(name)
            .await?
            .ok_or_else(|| CopyError::InstanceNotFound {
                name: name.to_string(),
            })?;

        self.rebind(&instance, &rebind_app_guids).await?;

        registry.expect_bindings(planned.application_names(), &instance.guid);
        registry.record_instance(instance, outcome);
        Ok(outcome)
    }

    /// Unbinds every application, deletes every key, then deletes the
    /// instance. Returns the GUIDs of the applications that were bound.
    async fn tear_down(&self, existing: &ServiceInstance) -> Result<Vec<String>, CopyError> {
        let mut rebind_app_guids = Vec::with_capacity(existing.service_bindings.len());

        for binding in &existing.service_bindings {
            debug!(
                app_guid = %binding.app_guid,
                service = %existing.name,
                "Unbinding application from service instance at destination"
            );
            let unbound = self
                .destination
                .service_bindings()
                .delete(existing, &binding.app_guid)
                .await?;
            if !unbound {
                warn!(
                    app_guid = %binding.app_guid,
                    service = %existing.name,
                    "Binding was already gone"
                );
            }
            rebind_app_guids.push(binding.app_guid.clone());
        }

        for key in &existing.service_keys {
            debug!(
                key_guid = %key.guid,
                service = %existing.name,
                "Deleting service key of service instance at destination"
            );
            self.destination
                .service_keys()
                .delete_service_key(&key.guid)
                .await?;
        }

        debug!(service = %existing.name, "Deleting existing service instance at destination");
        self.destination.services().delete_service(existing).await?;
        Ok(rebind_app_guids)
    }

    async fn create(&self, planned: &PlannedService) -> Result<(), CopyError> {
        let name = planned.name();
        match planned.strategy() {
            CopyStrategy::UserProvided(ups) | CopyStrategy::CredentialBridge(ups) => {
                info!(
                    service = %name,
                    "+ {name} as a user provided service instance at destination"
                );
                self.destination
                    .user_provided_services()
                    .create(&ups.name, "", "", &ups.credentials)
                    .await?;
                debug!(service = %name, "Created user provided service at destination");
            }
            CopyStrategy::ManagedClone {
                offering_label,
                plan_name,
            } => {
                info!(service = %name, "+ {name} as a managed service instance at destination");
                let plan_guid = self.resolve_plan_guid(offering_label, plan_name).await?;
                let source = planned.source();
                self.destination
                    .services()
                    .create_service_instance(name, &plan_guid, &source.params, &source.tags)
                    .await?;
                debug!(
                    service = %name,
                    plan_guid = %plan_guid,
                    "Created managed service at destination"
                );
            }
        }
        Ok(())
    }

    /// Finds the destination plan with the given name among the offerings
    /// carrying the given label.
    async fn resolve_plan_guid(&self, label: &str, plan_name: &str) -> Result<String, CopyError> {
        debug!(label = %label, plan = %plan_name, "Looking up the destination plan GUID");

        let space = self.destination.space();
        let offerings = match self
            .destination
            .services()
            .find_service_offerings_for_space_by_label(&space.guid, label)
            .await
        {
            Ok(offerings) => offerings,
            Err(err) if err.is_not_found() => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        for offering in &offerings {
            let plans = self
                .destination
                .service_plans()
                .search_by_offering(&offering.guid)
                .await?;
            if let Some(plan) = plans.into_iter().find(|p| p.name == plan_name) {
                debug!(
                    label = %label,
                    plan = %plan_name,
                    guid = %plan.guid,
                    "Resolved destination plan"
                );
                return Ok(plan.guid);
            }
        }

        Err(CopyError::plan_not_found(label, plan_name))
    }

    /// Binds each application to the new instance and requests a restage.
    async fn rebind(
        &self,
        instance: &ServiceInstance,
        app_guids: &[String],
    ) -> Result<(), CopyError> {
        for app_guid in app_guids {
            debug!(app_guid = %app_guid, service = %instance.name, "Rebinding app to service");
            self.destination
                .service_bindings()
                .create(&instance.guid, app_guid, &Params::new())
                .await?;
            self.destination
                .applications()
                .create_restage_request(app_guid)
                .await?;
        }
        Ok(())
    }
}
