//! Repository traits exposed by a space session.
//!
//! A [`SpaceSession`] is one authenticated view onto one space. The engine holds
//! two of them (source and destination) and only ever talks to a control plane
//! through these traits. Implementations must be thread-safe (`Send + Sync`).

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{
    Credentials, OrganizationFields, Params, ServiceInstance, ServiceKey, ServiceOfferingFields,
    ServicePlanFields, SpaceFields, UserProvidedService,
};

/// Summary listing of the service instances in the session's space.
#[async_trait]
pub trait ServiceSummaryRepository: Send + Sync {
    /// Lists every service instance in the current space.
    ///
    /// Summary entries carry names and bound application names; plan, offering
    /// and key details may be missing.
    async fn summaries_in_current_space(&self) -> Result<Vec<ServiceInstance>, ApiError>;
}

/// Service instance lookup, provisioning and catalog queries.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Finds a service instance in the current space by its exact name.
    ///
    /// Returns `None` if no instance carries that name.
    async fn find_instance_by_name(&self, name: &str)
    -> Result<Option<ServiceInstance>, ApiError>;

    /// Provisions a managed service instance from the given plan.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the plan does not exist.
    async fn create_service_instance(
        &self,
        name: &str,
        plan_guid: &str,
        params: &Params,
        tags: &[String],
    ) -> Result<(), ApiError>;

    /// Deletes a service instance.
    ///
    /// The instance must no longer have bindings or keys.
    async fn delete_service(&self, instance: &ServiceInstance) -> Result<(), ApiError>;

    /// Lists the offerings visible to a space that carry the given label.
    async fn find_service_offerings_for_space_by_label(
        &self,
        space_guid: &str,
        label: &str,
    ) -> Result<Vec<ServiceOfferingFields>, ApiError>;
}

/// Service plan catalog.
#[async_trait]
pub trait ServicePlanRepository: Send + Sync {
    /// Lists the plans of one service offering.
    async fn search_by_offering(
        &self,
        offering_guid: &str,
    ) -> Result<Vec<ServicePlanFields>, ApiError>;
}

/// User-provided service records.
#[async_trait]
pub trait UserProvidedServiceRepository: Send + Sync {
    /// Lists user-provided services visible to the session.
    async fn summaries(&self) -> Result<Vec<UserProvidedService>, ApiError>;

    /// Creates a user-provided service in the current space.
    async fn create(
        &self,
        name: &str,
        syslog_drain_url: &str,
        route_service_url: &str,
        credentials: &Credentials,
    ) -> Result<(), ApiError>;
}

/// Service keys on service instances.
#[async_trait]
pub trait ServiceKeyRepository: Send + Sync {
    /// Creates a key on an instance.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::AlreadyExists` if the instance already has a key with
    /// that name.
    async fn create_service_key(
        &self,
        instance_guid: &str,
        key_name: &str,
        params: &Params,
    ) -> Result<(), ApiError>;

    /// Fetches a key on an instance by name, with its credentials.
    async fn get_service_key(
        &self,
        instance_guid: &str,
        key_name: &str,
    ) -> Result<Option<ServiceKey>, ApiError>;

    /// Deletes a key by GUID.
    async fn delete_service_key(&self, key_guid: &str) -> Result<(), ApiError>;
}

/// Bindings between service instances and applications.
#[async_trait]
pub trait ServiceBindingRepository: Send + Sync {
    /// Binds an application to an instance.
    async fn create(
        &self,
        instance_guid: &str,
        app_guid: &str,
        params: &Params,
    ) -> Result<(), ApiError>;

    /// Unbinds an application from an instance.
    ///
    /// Returns `false` if the application was not bound.
    async fn delete(&self, instance: &ServiceInstance, app_guid: &str) -> Result<bool, ApiError>;
}

/// Application lifecycle requests.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Requests a restage so that new bindings take effect.
    async fn create_restage_request(&self, app_guid: &str) -> Result<(), ApiError>;
}

/// One authenticated session scoped to a single org and space.
pub trait SpaceSession: Send + Sync {
    /// Returns the organization this session targets.
    fn org(&self) -> OrganizationFields;

    /// Returns the space this session targets.
    fn space(&self) -> SpaceFields;

    fn service_summary(&self) -> &dyn ServiceSummaryRepository;

    fn services(&self) -> &dyn ServiceRepository;

    fn service_plans(&self) -> &dyn ServicePlanRepository;

    fn user_provided_services(&self) -> &dyn UserProvidedServiceRepository;

    fn service_keys(&self) -> &dyn ServiceKeyRepository;

    fn service_bindings(&self) -> &dyn ServiceBindingRepository;

    fn applications(&self) -> &dyn ApplicationRepository;

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
