//! Reads the service landscape of the source space.

use spacecopy_api::{ApiError, ServiceInstance, SpaceSession, UserProvidedService};
use tracing::debug;

use crate::error::CopyError;

/// Unfiltered view of a space's services.
#[derive(Debug, Clone, Default)]
pub struct ServiceSnapshot {
    /// User-provided service summary entries.
    pub user_provided: Vec<UserProvidedService>,
    /// Summary entries of every service instance in the space.
    pub instances: Vec<ServiceInstance>,
}

/// Retrieves the user-provided service summary and the service instance
/// summary of the session's space, as returned.
pub async fn collect(session: &dyn SpaceSession) -> Result<ServiceSnapshot, CopyError> {
    let space = session.space();

    let user_provided = session.user_provided_services().summaries().await?;

    let instances = session.service_summary().summaries_in_current_space().await?;

    debug!(
        space = %space.name,
        backend = session.backend_name(),
        user_provided = user_provided.len(),
        instances = instances.len(),
        "Collected service snapshot"
    );
    Ok(ServiceSnapshot {
        user_provided,
        instances,
    })
}

/// Re-reads a summary entry by name to obtain its plan, offering, keys,
/// params and tags.
pub async fn fetch_detail(
    session: &dyn SpaceSession,
    summary: &ServiceInstance,
) -> Result<ServiceInstance, CopyError> {
    session
        .services()
        .find_instance_by_name(&summary.name)
        .await?
        .ok_or_else(|| ApiError::not_found("service instance", &summary.name).into())
}
