//! Certificate persistence abstraction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use ssl_orchestrator_provider::Certificate;

use crate::error::CoreResult;

/// Persistence sink for downloaded certificate material.
///
/// Implementations decide the medium (filesystem, secret manager, ...).
/// The path lookups exist so that post commands can reference the
/// artifacts; after a successful [`save`](Self::save) they must resolve to
/// the stored leaf/key/fullchain for that domain.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    /// Persists the certificate material for `domain`.
    async fn save(&self, domain: &str, certificate: &Certificate) -> CoreResult<()>;

    /// Directory holding the domain's artifacts.
    fn cert_dir(&self, domain: &str) -> PathBuf;

    /// Path of the leaf certificate artifact.
    fn cert_path(&self, domain: &str) -> PathBuf;

    /// Path of the private key artifact.
    fn key_path(&self, domain: &str) -> PathBuf;

    /// Path of the full chain artifact.
    fn fullchain_path(&self, domain: &str) -> PathBuf;
}

/// In-memory certificate store.
///
/// Keeps everything in a map; paths are derived from a virtual base
/// directory. Meant for tests and dry runs.
pub struct InMemoryCertificateStore {
    base_dir: PathBuf,
    certificates: RwLock<HashMap<String, Certificate>>,
}

impl InMemoryCertificateStore {
    /// Creates a store rooted at a virtual base directory.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            certificates: RwLock::new(HashMap::new()),
        }
    }

    /// The stored certificate for `domain`, if any.
    pub async fn get(&self, domain: &str) -> Option<Certificate> {
        self.certificates.read().await.get(domain).cloned()
    }

    /// How many domains have a stored certificate.
    pub async fn len(&self) -> usize {
        self.certificates.read().await.len()
    }

    /// Whether nothing has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.certificates.read().await.is_empty()
    }
}

impl Default for InMemoryCertificateStore {
    fn default() -> Self {
        Self::new(Path::new("certs"))
    }
}

#[async_trait]
impl CertificateStore for InMemoryCertificateStore {
    async fn save(&self, domain: &str, certificate: &Certificate) -> CoreResult<()> {
        self.certificates
            .write()
            .await
            .insert(domain.to_string(), certificate.clone());
        Ok(())
    }

    fn cert_dir(&self, domain: &str) -> PathBuf {
        self.base_dir.join(domain)
    }

    fn cert_path(&self, domain: &str) -> PathBuf {
        self.cert_dir(domain).join("cert.pem")
    }

    fn key_path(&self, domain: &str) -> PathBuf {
        self.cert_dir(domain).join("key.pem")
    }

    fn fullchain_path(&self, domain: &str) -> PathBuf {
        self.cert_dir(domain).join("fullchain.pem")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_get() {
        let store = InMemoryCertificateStore::default();
        assert!(store.is_empty().await);

        let cert = Certificate {
            certificate: "LEAF".into(),
            private_key: "KEY".into(),
            chain: None,
        };
        let res = store.save("www.example.com", &cert).await;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");

        let stored = store.get("www.example.com").await;
        assert_eq!(stored.map(|c| c.certificate), Some("LEAF".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn paths_are_domain_scoped() {
        let store = InMemoryCertificateStore::new("/var/lib/certs");
        assert_eq!(
            store.cert_path("www.example.com"),
            PathBuf::from("/var/lib/certs/www.example.com/cert.pem")
        );
        assert_eq!(
            store.key_path("www.example.com"),
            PathBuf::from("/var/lib/certs/www.example.com/key.pem")
        );
        assert_eq!(
            store.fullchain_path("www.example.com"),
            PathBuf::from("/var/lib/certs/www.example.com/fullchain.pem")
        );
    }
}
