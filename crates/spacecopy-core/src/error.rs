use spacecopy_api::ApiError;
use thiserror::Error;

/// Errors raised while collecting or copying services.
///
/// None of these are retried; the first one aborts the running operation and
/// already-applied destination changes stay in place.
#[derive(Debug, Error)]
pub enum CopyError {
    /// A control-plane call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No destination plan matches the source offering label and plan name.
    #[error("Unable to determine the GUID for service '{label}' plan name '{plan}'")]
    PlanNotFound { label: String, plan: String },

    /// Two source services would share one bridge key name.
    #[error(
        "Service key name '{key_name}' would be shared by services '{first}' and '{second}'; adjust the service key format"
    )]
    KeyNameCollision {
        key_name: String,
        first: String,
        second: String,
    },

    /// A destination instance could not be re-read after reconciliation.
    #[error("Service instance '{name}' was not found at the destination")]
    InstanceNotFound { name: String },

    #[error("Invalid service key format '{format}': {reason}")]
    InvalidKeyTemplate { format: String, reason: String },
}

impl CopyError {
    pub fn plan_not_found(label: impl Into<String>, plan: impl Into<String>) -> Self {
        Self::PlanNotFound {
            label: label.into(),
            plan: plan.into(),
        }
    }

    /// Returns `true` if the error reports a missing entity.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Api(err) => err.is_not_found(),
            Self::PlanNotFound { .. } | Self::InstanceNotFound { .. } => true,
            Self::KeyNameCollision { .. } | Self::InvalidKeyTemplate { .. } => false,
        }
    }
}
