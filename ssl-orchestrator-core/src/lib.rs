//! # ssl-orchestrator-core
//!
//! Core business logic for automated DV certificate lifecycle management:
//! - Provider registry (lazy, cached, credential-checked capability
//!   instances)
//! - Online certificate validator (TLS probe without chain verification)
//! - Certificate manager (reuse decision, issuance, DNS-01 validation
//!   polling, resume from an order id, batch runs with bounded fan-out)
//! - Post command executor
//!
//! The library is platform-independent: persistence, notification delivery
//! and the concrete cloud adapters are abstracted behind traits and injected
//! at the composition root.
//!
//! ## Wiring
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use ssl_orchestrator_core::{
//!     CertificateManager, Config, InMemoryCertificateStore, NullNotifier, ProviderRegistry,
//! };
//! use ssl_orchestrator_provider::ProviderFactory;
//!
//! async fn run(
//!     config: Config,
//!     factory: Arc<dyn ProviderFactory>,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     config.validate()?;
//!
//!     let registry = Arc::new(ProviderRegistry::new(config.providers.clone(), factory));
//!     let manager = CertificateManager::new(
//!         config,
//!         registry,
//!         Arc::new(InMemoryCertificateStore::default()),
//!         Arc::new(NullNotifier),
//!     );
//!
//!     let shutdown = CancellationToken::new();
//!     let outcome = manager.run(&shutdown).await?;
//!     println!("{} ok, {} failed", outcome.processed, outcome.failures.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{
    BatchOutcome, CertificateManager, CertValidator, DomainFailure, DomainOutcome, Executor,
    PollTiming, ProviderRegistry, RenewalCheck,
};
pub use traits::{
    CertificateStore, InMemoryCertificateStore, LogNotifier, Notifier, NullNotifier,
};
pub use types::{Config, DomainConfig, Event, EventKind, ProvidersConfig};
