//! Provider construction seam.

use std::sync::Arc;

use crate::error::Result;
use crate::traits::{CertProvider, DnsProvider};
use crate::types::ProviderCredentials;

/// Builds capability instances from credentials.
///
/// The concrete platform adapters (one crate per cloud vendor) implement
/// this; the orchestration core only decides *which* credentials to hand
/// over, keyed by [`ProviderKind`](crate::ProviderKind). Construction is
/// synchronous and must not touch the network; the registry performs the
/// online credential check afterwards via
/// [`validate_credentials`](crate::CertProvider::validate_credentials).
pub trait ProviderFactory: Send + Sync {
    /// Creates a certificate-authority capability for the platform named by
    /// the credential variant.
    fn cert_provider(&self, credentials: &ProviderCredentials) -> Result<Arc<dyn CertProvider>>;

    /// Creates a DNS-host capability for the platform named by the
    /// credential variant.
    fn dns_provider(&self, credentials: &ProviderCredentials) -> Result<Arc<dyn DnsProvider>>;
}
