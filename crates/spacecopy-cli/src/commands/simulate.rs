use std::sync::Arc;

use anyhow::{Context, Result};
use spacecopy_config::CopyConfig;
use spacecopy_core::{CopyPolicy, KeyNameTemplate, ServiceCollection, ServicesManager};
use spacecopy_memory::{InMemorySpace, SpaceFixture};
use tracing::info;

use crate::cli::SimulateArgs;
use crate::output::{bindings_table, print_heading, print_success, services_table};

/// Both spaces after a simulated copy, with the collection it produced.
pub struct Simulation {
    pub source: Arc<InMemorySpace>,
    pub destination: Arc<InMemorySpace>,
    pub services: ServiceCollection,
}

/// Lists extend the configured ones; `--recreate` turns recreation on.
pub fn apply_overrides(config: &mut CopyConfig, args: &SimulateArgs) {
    let ups = &mut config.copy_as_ups;
    for name in &args.ups_instances {
        if !ups.instances.contains(name) {
            ups.instances.push(name.clone());
        }
    }
    for label in &args.ups_offerings {
        if !ups.offering_labels.contains(label) {
            ups.offering_labels.push(label.clone());
        }
    }
    if args.recreate {
        config.recreate = true;
    }
}

pub async fn execute(args: &SimulateArgs, config: &CopyConfig) -> Result<Simulation> {
    let source = SpaceFixture::load(&args.source).context("Failed to load source space")?;
    let destination =
        SpaceFixture::load(&args.destination).context("Failed to load destination space")?;
    let source = spacecopy_memory::create_session(source);
    let destination = spacecopy_memory::create_session(destination);

    let template = KeyNameTemplate::parse(&config.service_key_format)?;
    let manager = ServicesManager::new(source.clone(), destination.clone(), template)?;
    let policy = CopyPolicy::new()
        .with_instances_as_ups(config.copy_as_ups.instances.iter().cloned())
        .with_offering_labels_as_ups(config.copy_as_ups.offering_labels.iter().cloned());

    info!(
        apps = ?args.apps,
        recreate = config.recreate,
        "Simulating service copy"
    );
    let mut services = manager
        .services_to_be_copied(&args.apps, &policy)
        .await
        .context("Failed to determine services to copy")?;
    manager
        .do_copy(&mut services, config.recreate)
        .await
        .context("Failed to copy services")?;

    Ok(Simulation {
        source,
        destination,
        services,
    })
}

pub async fn run(args: &SimulateArgs, config: &CopyConfig) -> Result<()> {
    let simulation = execute(args, config).await?;

    print_heading("Services");
    println!("{}", services_table(&simulation.services));
    print_heading("Application bindings");
    println!("{}", bindings_table(&simulation.services, &args.apps));

    if let Some(path) = &args.write_source {
        simulation.source.snapshot().await.save(path)?;
        print_success(&format!("Wrote source space to {}", path.display()));
    }
    if let Some(path) = &args.write_destination {
        simulation.destination.snapshot().await.save(path)?;
        print_success(&format!("Wrote destination space to {}", path.display()));
    }

    print_success(&format!(
        "Copied {} service(s) for {} application(s)",
        simulation.services.len(),
        args.apps.len()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use spacecopy_api::{
        OrganizationFields, ServiceInstance, ServiceOfferingFields, ServicePlanFields,
        SpaceFields,
    };
    use spacecopy_core::ServiceOutcome;

    use super::*;

    fn space(guid: &str, name: &str) -> SpaceFixture {
        SpaceFixture::new(
            OrganizationFields {
                guid: format!("org-{guid}"),
                name: format!("{name}Org"),
            },
            SpaceFields {
                guid: guid.to_string(),
                name: name.to_string(),
            },
        )
    }

    fn write_fixtures(dir: &Path) -> (PathBuf, PathBuf) {
        let source = space("space-1000", "src").with_instance(ServiceInstance {
            guid: "svc-1000".into(),
            name: "svc1".into(),
            application_names: vec!["app1".into()],
            service_plan: ServicePlanFields {
                guid: "plan-1000".into(),
                name: "Large".into(),
            },
            service_offering: ServiceOfferingFields {
                guid: "offering-1000".into(),
                label: "MySQL".into(),
            },
            ..Default::default()
        });
        let destination = space("space-2000", "dest")
            .with_application("app-2000", "app1")
            .with_offering("offering-2000", "MySQL", &[("plan-2000", "Large")]);

        let source_path = dir.join("source.json");
        let destination_path = dir.join("destination.json");
        source.save(&source_path).unwrap();
        destination.save(&destination_path).unwrap();
        (source_path, destination_path)
    }

    fn args(source: PathBuf, destination: PathBuf) -> SimulateArgs {
        SimulateArgs {
            source,
            destination,
            apps: vec!["app1".to_string()],
            ups_instances: Vec::new(),
            ups_offerings: Vec::new(),
            recreate: false,
            write_source: None,
            write_destination: None,
        }
    }

    #[test]
    fn test_overrides_extend_lists_without_duplicates() {
        let mut config = CopyConfig::default();
        config.copy_as_ups.instances = vec!["svc1".to_string()];

        let mut simulate = args(PathBuf::new(), PathBuf::new());
        simulate.ups_instances = vec!["svc1".to_string(), "svc2".to_string()];
        simulate.ups_offerings = vec!["RabbitMQ".to_string()];
        simulate.recreate = true;

        apply_overrides(&mut config, &simulate);
        assert_eq!(config.copy_as_ups.instances, vec!["svc1", "svc2"]);
        assert_eq!(config.copy_as_ups.offering_labels, vec!["RabbitMQ"]);
        assert!(config.recreate);
    }

    #[tokio::test]
    async fn test_execute_copies_managed_service() {
        let dir = tempfile::tempdir().unwrap();
        let (source, destination) = write_fixtures(dir.path());

        let simulation = execute(&args(source, destination), &CopyConfig::default())
            .await
            .unwrap();

        assert_eq!(
            simulation.services.outcome("svc1"),
            Some(ServiceOutcome::Created)
        );
        let copied = simulation.destination.instance_named("svc1").await.unwrap();
        assert_eq!(copied.service_plan.guid, "plan-2000");
        assert_eq!(
            simulation.services.app_bindings("app1"),
            Some(&[copied.guid][..])
        );
    }

    #[tokio::test]
    async fn test_execute_bridges_with_configured_key_format() {
        let dir = tempfile::tempdir().unwrap();
        let (source, destination) = write_fixtures(dir.path());
        let mut config = CopyConfig {
            service_key_format: "bridge-{service}-{space}".to_string(),
            ..Default::default()
        };
        let mut simulate = args(source, destination);
        simulate.ups_offerings = vec!["MySQL".to_string()];
        apply_overrides(&mut config, &simulate);

        let simulation = execute(&simulate, &config).await.unwrap();

        let keys = simulation.source.service_keys_of("svc-1000").await;
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].name, "bridge-svc1-dest");
        let ups = simulation
            .destination
            .user_provided_named("svc1")
            .await
            .unwrap();
        assert_eq!(ups.credentials, keys[0].credentials);
    }

    #[tokio::test]
    async fn test_execute_reports_missing_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let result = execute(&args(missing.clone(), missing), &CopyConfig::default()).await;
        let err = match result {
            Ok(_) => panic!("expected an error"),
            Err(err) => err,
        };
        assert!(format!("{err:#}").contains("Failed to load source space"));
    }
}
