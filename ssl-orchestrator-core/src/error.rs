//! Unified error type definition

use thiserror::Error;

// Re-export library error type
pub use ssl_orchestrator_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Bad or missing configuration: unknown provider name, absent
    /// credentials. Always raised before any network activity.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid input (domain config values, renewal thresholds, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Repeated consecutive failures while polling an order's status.
    #[error("certificate status check failed {attempts} times in a row: {source}")]
    StatusPolling {
        /// How many consecutive polls failed.
        attempts: u32,
        /// The last provider error observed.
        source: ProviderError,
    },

    /// Domain validation did not reach a terminal state within the polling
    /// window. The order is still alive at the CA; feed the order id back
    /// through `resume_order` to pick it up again.
    #[error("domain validation timed out, check the cloud console (order id: {order_id})")]
    ValidationTimeout {
        /// Order to resume with.
        order_id: String,
    },

    /// The CA terminally rejected the order. Not retried; the next
    /// scheduled run starts a fresh order.
    #[error("certificate order {order_id} failed at the CA")]
    IssuanceFailed {
        /// The rejected order.
        order_id: String,
    },

    /// The operation was interrupted by shutdown.
    #[error("operation cancelled")]
    Cancelled,

    /// network error
    #[error("Network error: {0}")]
    Network(String),

    /// Certificate persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Post command returned a failure.
    #[error("Hook error: {0}")]
    Hook(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not
    /// exist, etc.), used for log level selection.
    ///
    /// Level `warn` should be used when returning `true` and level `error`
    /// when returning `false`.
    /// **Please update this method simultaneously when new variants are
    /// added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Configuration(_) | Self::Validation(_) | Self::Cancelled => true,
            Self::Provider(e) => e.is_expected(),
            _ => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
