//! Service keys used to read a managed service's credentials on the source.
//!
//! A bridge key exists only while the bridging policy applies to its service;
//! it is never copied itself.

use spacecopy_api::{ApiError, Credentials, Params, ServiceInstance, SpaceSession};
use tracing::debug;

use crate::error::CopyError;

/// Key operations against the source session.
pub struct CredentialBridge<'a> {
    session: &'a dyn SpaceSession,
}

impl<'a> CredentialBridge<'a> {
    pub fn new(session: &'a dyn SpaceSession) -> Self {
        Self { session }
    }

    /// Creates the key with empty parameters unless one with that name exists.
    pub async fn ensure_key(
        &self,
        instance: &ServiceInstance,
        key_name: &str,
    ) -> Result<(), CopyError> {
        let keys = self.session.service_keys();
        if keys.get_service_key(&instance.guid, key_name).await?.is_some() {
            return Ok(());
        }

        debug!(
            key = %key_name,
            service = %instance.name,
            "Creating service key as source of credentials for target user-provided service"
        );
        keys.create_service_key(&instance.guid, key_name, &Params::new())
            .await?;
        Ok(())
    }

    /// Reads the key's credential mapping.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the key does not exist.
    pub async fn read_key(
        &self,
        instance: &ServiceInstance,
        key_name: &str,
    ) -> Result<Credentials, CopyError> {
        let key = self
            .session
            .service_keys()
            .get_service_key(&instance.guid, key_name)
            .await?
            .ok_or_else(|| ApiError::not_found("service key", key_name))?;
        Ok(key.credentials)
    }

    /// Deletes the key if it exists.
    pub async fn retire_key(
        &self,
        instance: &ServiceInstance,
        key_name: &str,
    ) -> Result<(), CopyError> {
        let keys = self.session.service_keys();
        let Some(key) = keys.get_service_key(&instance.guid, key_name).await? else {
            return Ok(());
        };

        debug!(
            key = %key_name,
            service = %instance.name,
            "Deleting service key that is no longer needed"
        );
        keys.delete_service_key(&key.guid).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use spacecopy_api::{OrganizationFields, ServiceOfferingFields, ServicePlanFields, SpaceFields};
    use spacecopy_memory::{OperationKind, SpaceFixture};

    use super::*;

    fn svc1() -> ServiceInstance {
        ServiceInstance {
            guid: "svc-1000".into(),
            name: "svc1".into(),
            service_plan: ServicePlanFields {
                guid: "plan-1000".into(),
                name: "Small".into(),
            },
            service_offering: ServiceOfferingFields {
                guid: "offering-1000".into(),
                label: "MySQL".into(),
            },
            ..Default::default()
        }
    }

    fn source() -> std::sync::Arc<spacecopy_memory::InMemorySpace> {
        spacecopy_memory::create_session(
            SpaceFixture::new(
                OrganizationFields {
                    guid: "org-1000".into(),
                    name: "srcOrg".into(),
                },
                SpaceFields {
                    guid: "space-1000".into(),
                    name: "srcSpace".into(),
                },
            )
            .with_instance(svc1()),
        )
    }

    #[tokio::test]
    async fn test_ensure_key_creates_once() {
        let source = source();
        let bridge = CredentialBridge::new(source.as_ref());

        bridge.ensure_key(&svc1(), "bridge-svc1").await.unwrap();
        bridge.ensure_key(&svc1(), "bridge-svc1").await.unwrap();

        let created = source
            .operations()
            .await
            .iter()
            .filter(|op| op.kind() == OperationKind::CreateServiceKey)
            .count();
        assert_eq!(created, 1);
        assert!(!bridge.read_key(&svc1(), "bridge-svc1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retire_key_deletes_only_existing_key() {
        let source = source();
        let bridge = CredentialBridge::new(source.as_ref());

        bridge.retire_key(&svc1(), "bridge-svc1").await.unwrap();
        assert!(source.operations().await.is_empty());

        bridge.ensure_key(&svc1(), "bridge-svc1").await.unwrap();
        bridge.retire_key(&svc1(), "bridge-svc1").await.unwrap();
        assert!(source.service_keys_of("svc-1000").await.is_empty());

        let err = bridge.read_key(&svc1(), "bridge-svc1").await.unwrap_err();
        assert!(matches!(err, CopyError::Api(ApiError::NotFound { .. })));
    }
}
