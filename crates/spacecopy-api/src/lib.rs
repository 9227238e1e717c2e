//! # spacecopy-api
//!
//! Capability facade for the spacecopy engine.
//!
//! This crate defines the models and repository traits a control-plane
//! session must provide. It does not contain any implementations; transport,
//! authentication and token refresh live behind [`SpaceSession`].
//!
//! ## Example
//!
//! ```ignore
//! use spacecopy_api::{ApiError, ServiceInstance, SpaceSession};
//!
//! async fn require_instance(
//!     session: &dyn SpaceSession,
//!     name: &str,
//! ) -> Result<ServiceInstance, ApiError> {
//!     session
//!         .services()
//!         .find_instance_by_name(name)
//!         .await?
//!         .ok_or_else(|| ApiError::not_found("service instance", name))
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ApiError, ErrorCategory};
pub use traits::{
    ApplicationRepository, ServiceBindingRepository, ServiceKeyRepository, ServicePlanRepository,
    ServiceRepository, ServiceSummaryRepository, SpaceSession, UserProvidedServiceRepository,
};
pub use types::{
    ApplicationFields, Credentials, OrganizationFields, Params, ServiceBindingFields,
    ServiceInstance, ServiceKey, ServiceKeyFields, ServiceOfferingFields, ServicePlanFields,
    SpaceFields, UserProvidedService,
};

/// Type alias for a shareable session trait object.
pub type DynSession = std::sync::Arc<dyn SpaceSession>;
