//! # spacecopy-core
//!
//! Copies the services bound to a set of applications from one space to
//! another.
//!
//! The copy runs in two phases:
//!
//! 1. [`ServicesManager::services_to_be_copied`] reads the source space,
//!    selects the services bound to the requested applications and decides
//!    per service whether it is copied as a user-provided service, bridged
//!    through a source service key, or re-provisioned as a managed service.
//! 2. [`ServicesManager::do_copy`] creates (or reuses, or recreates) each
//!    service at the destination and records which destination instances each
//!    application should be bound to.
//!
//! ## Example
//!
//! ```ignore
//! use spacecopy_core::{CopyPolicy, KeyNameTemplate, ServicesManager};
//!
//! let template = KeyNameTemplate::parse("__{service}_copy_for_/{org}/{space}")?;
//! let manager = ServicesManager::new(source, destination, template)?;
//!
//! let policy = CopyPolicy::new().with_offering_labels_as_ups(["RabbitMQ"]);
//! let mut services = manager.services_to_be_copied(&app_names, &policy).await?;
//! manager.do_copy(&mut services, false).await?;
//!
//! for guid in services.app_bindings("app1").unwrap_or_default() {
//!     println!("bind app1 to {guid}");
//! }
//! ```

pub mod bridge;
pub mod classify;
pub mod collection;
pub mod collector;
pub mod error;
pub mod manager;
pub mod reconcile;
pub mod registry;
pub mod template;

pub use bridge::CredentialBridge;
pub use classify::{Classification, CopyPolicy, classify, narrow_bindings};
pub use collection::{CopyStrategy, PlannedService, ServiceCollection};
pub use collector::ServiceSnapshot;
pub use error::CopyError;
pub use manager::ServicesManager;
pub use reconcile::Reconciler;
pub use registry::{BindingRegistry, ServiceOutcome};
pub use template::{KeyNameTemplate, MAX_KEY_NAME_LEN};
