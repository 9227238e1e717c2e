use spacecopy_api::{DynSession, ServiceInstance, UserProvidedService};
use tracing::{debug, info};

use crate::bridge::CredentialBridge;
use crate::classify::{Classification, CopyPolicy, classify, narrow_bindings};
use crate::collection::{CopyStrategy, PlannedService, ServiceCollection};
use crate::collector;
use crate::error::CopyError;
use crate::reconcile::Reconciler;
use crate::registry::BindingRegistry;
use crate::template::KeyNameTemplate;

/// Copies the services bound to a set of applications from a source space to
/// a destination space.
///
/// [`ServicesManager::services_to_be_copied`] only talks to the source;
/// [`ServicesManager::do_copy`] only talks to the destination.
pub struct ServicesManager {
    source: DynSession,
    destination: DynSession,
    key_template: KeyNameTemplate,
}

impl ServicesManager {
    /// Creates a manager. `{org}` and `{space}` in the key template are bound
    /// to the destination's org and space names.
    ///
    /// # Errors
    ///
    /// Returns [`CopyError::InvalidKeyTemplate`] if binding the destination
    /// names leaves the template without exactly one `{service}` placeholder.
    pub fn new(
        source: DynSession,
        destination: DynSession,
        key_template: KeyNameTemplate,
    ) -> Result<Self, CopyError> {
        let key_template =
            key_template.bind_destination(&destination.org().name, &destination.space().name)?;
        Ok(Self {
            source,
            destination,
            key_template,
        })
    }

    pub fn key_template(&self) -> &KeyNameTemplate {
        &self.key_template
    }

    /// Selects and classifies the source services bound to any of `app_names`.
    ///
    /// Bridged services get a source service key (created if missing) whose
    /// credentials are captured; managed services that are no longer bridged
    /// lose their leftover bridge key.
    pub async fn services_to_be_copied(
        &self,
        app_names: &[String],
        policy: &CopyPolicy,
    ) -> Result<ServiceCollection, CopyError> {
        let source = self.source.as_ref();
        let snapshot = collector::collect(source).await?;

        let mut selected: Vec<ServiceInstance> = Vec::new();
        for summary in &snapshot.instances {
            let Some(bound_apps) = narrow_bindings(summary, app_names) else {
                continue;
            };
            let mut instance = collector::fetch_detail(source, summary).await?;
            instance.application_names = bound_apps;
            selected.push(instance);
        }

        let decisions: Vec<(ServiceInstance, Classification<'_>)> = selected
            .into_iter()
            .map(|instance| {
                let decision = classify(&instance, &snapshot.user_provided, policy);
                (instance, decision)
            })
            .collect();

        self.key_template.check_unique(
            decisions
                .iter()
                .filter(|(_, d)| !matches!(d, Classification::Passthrough(_)))
                .map(|(instance, _)| instance.name.as_str()),
        )?;

        let bridge = CredentialBridge::new(source);
        let mut collection = ServiceCollection::default();
        for (instance, decision) in decisions {
            let strategy = match decision {
                Classification::Passthrough(ups) => {
                    debug!(service = %instance.name, "User provided service to copy");
                    CopyStrategy::UserProvided(ups.clone())
                }
                Classification::CredentialBridge => {
                    debug!(
                        service = %instance.name,
                        "Managed service that will be copied as a user provided service"
                    );
                    let key_name = self.key_template.render(&instance.name);
                    bridge.ensure_key(&instance, &key_name).await?;
                    let credentials = bridge.read_key(&instance, &key_name).await?;
                    CopyStrategy::CredentialBridge(UserProvidedService {
                        name: instance.name.clone(),
                        credentials,
                        ..Default::default()
                    })
                }
                Classification::ManagedClone => {
                    let key_name = self.key_template.render(&instance.name);
                    bridge.retire_key(&instance, &key_name).await?;
                    debug!(
                        service = %instance.name,
                        "Managed service that will be re-created as a managed service at the destination"
                    );
                    CopyStrategy::ManagedClone {
                        offering_label: instance.service_offering.label.clone(),
                        plan_name: instance.service_plan.name.clone(),
                    }
                }
            };
            collection.planned.push(PlannedService { instance, strategy });
        }

        debug!(
            services = ?collection.planned.iter().map(PlannedService::name).collect::<Vec<_>>(),
            "Services to be copied"
        );
        Ok(collection)
    }

    /// Creates the collected services at the destination.
    ///
    /// With `recreate`, same-named destination instances are unbound, stripped
    /// of keys, deleted and rebuilt, and their applications rebound and
    /// restaged. Without it they are reused as they are.
    ///
    /// Results of an earlier run on the same collection are discarded.
    pub async fn do_copy(
        &self,
        collection: &mut ServiceCollection,
        recreate: bool,
    ) -> Result<(), CopyError> {
        collection.registry = BindingRegistry::default();
        info!(
            services = collection.planned.len(),
            recreate, "Creating service copies at destination..."
        );

        let reconciler = Reconciler::new(self.destination.as_ref());
        for planned in &collection.planned {
            reconciler
                .reconcile(planned, recreate, &mut collection.registry)
                .await?;
        }
        Ok(())
    }
}
