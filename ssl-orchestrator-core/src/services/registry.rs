//! Provider 实例注册表
//!
//! Resolves a platform name to a constructed, credential-checked capability
//! instance. Instances are cached for the process lifetime and never
//! evicted; the registry is created once at the composition root and shared.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use ssl_orchestrator_provider::{
    CertProvider, DnsProvider, ProviderCredentials, ProviderError, ProviderFactory, ProviderKind,
};

use crate::error::{CoreError, CoreResult};
use crate::types::{DomainConfig, ProvidersConfig};

type CertCell = Arc<OnceCell<Arc<dyn CertProvider>>>;
type DnsCell = Arc<OnceCell<Arc<dyn DnsProvider>>>;

/// Lazily constructing, caching provider registry.
///
/// The first call per (capability, platform) key constructs the instance
/// through the injected [`ProviderFactory`] and validates its credentials
/// online; later calls return the cached instance. Concurrent first access
/// to the same key is serialized by a per-key cell, so construction and the
/// credential check run at most once; the map lock itself is never held
/// across I/O. A failed construction leaves the slot empty and a later call
/// retries.
pub struct ProviderRegistry {
    providers: ProvidersConfig,
    factory: Arc<dyn ProviderFactory>,
    cert_cells: Mutex<HashMap<ProviderKind, CertCell>>,
    dns_cells: Mutex<HashMap<ProviderKind, DnsCell>>,
}

impl ProviderRegistry {
    /// Creates a registry over the configured credentials and a platform
    /// adapter factory.
    #[must_use]
    pub fn new(providers: ProvidersConfig, factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            providers,
            factory,
            cert_cells: Mutex::new(HashMap::new()),
            dns_cells: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves a platform name, failing before any network activity when
    /// the name is unknown or no credentials are configured for it.
    fn resolve(&self, name: &str) -> CoreResult<(ProviderKind, ProviderCredentials)> {
        let kind: ProviderKind = name
            .parse()
            .map_err(|e| CoreError::Configuration(format!("{e}")))?;
        let credentials = self.providers.credentials_for(kind).ok_or_else(|| {
            CoreError::Configuration(format!("provider {kind} has no credentials configured"))
        })?;
        Ok((kind, credentials))
    }

    /// 获取证书提供商
    pub async fn cert_provider(&self, name: &str) -> CoreResult<Arc<dyn CertProvider>> {
        let (kind, credentials) = self.resolve(name)?;

        let cell = {
            #[allow(clippy::unwrap_used)] // the map lock is never poisoned: no panics under it
            let mut cells = self.cert_cells.lock().unwrap();
            cells.entry(kind).or_default().clone()
        };

        cell.get_or_try_init(|| async {
            let provider = self.factory.cert_provider(&credentials)?;
            Self::check_credentials(kind, provider.validate_credentials().await)?;
            log::debug!("certificate provider {kind} ready");
            Ok::<_, CoreError>(provider)
        })
        .await
        .cloned()
    }

    /// 获取 DNS 提供商
    pub async fn dns_provider(&self, name: &str) -> CoreResult<Arc<dyn DnsProvider>> {
        let (kind, credentials) = self.resolve(name)?;

        let cell = {
            #[allow(clippy::unwrap_used)] // the map lock is never poisoned: no panics under it
            let mut cells = self.dns_cells.lock().unwrap();
            cells.entry(kind).or_default().clone()
        };

        cell.get_or_try_init(|| async {
            let provider = self.factory.dns_provider(&credentials)?;
            Self::check_credentials(kind, provider.validate_credentials().await)?;
            log::debug!("DNS provider {kind} ready");
            Ok::<_, CoreError>(provider)
        })
        .await
        .cloned()
    }

    /// Both capabilities a domain is configured to use.
    pub async fn providers_for_domain(
        &self,
        domain: &DomainConfig,
    ) -> CoreResult<(Arc<dyn CertProvider>, Arc<dyn DnsProvider>)> {
        let cert = self.cert_provider(domain.cert_provider()).await?;
        let dns = self.dns_provider(domain.dns_provider()).await?;
        Ok((cert, dns))
    }

    fn check_credentials(
        kind: ProviderKind,
        validated: Result<bool, ProviderError>,
    ) -> CoreResult<()> {
        match validated {
            Ok(true) => Ok(()),
            Ok(false) => Err(CoreError::Provider(ProviderError::InvalidCredentials {
                provider: kind.to_string(),
                raw_message: None,
            })),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{aliyun_only_providers, MockProviderFactory};
    use std::sync::atomic::Ordering;

    fn registry(factory: &Arc<MockProviderFactory>) -> ProviderRegistry {
        ProviderRegistry::new(
            aliyun_only_providers(),
            Arc::clone(factory) as Arc<dyn ProviderFactory>,
        )
    }

    #[tokio::test]
    async fn unknown_name_is_a_configuration_error() {
        let factory = MockProviderFactory::arc();
        let registry = registry(&factory);

        let res = registry.cert_provider("route53").await;
        assert!(
            matches!(&res, Err(CoreError::Configuration(_))),
            "unexpected result: {:?}",
            res.as_ref().err()
        );
        assert_eq!(factory.cert_builds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_credentials_is_a_configuration_error() {
        let factory = MockProviderFactory::arc();
        let registry = registry(&factory);

        let res = registry.cert_provider("tencent").await;
        assert!(
            matches!(&res, Err(CoreError::Configuration(msg)) if msg.contains("tencent")),
            "unexpected result: {:?}",
            res.as_ref().err()
        );
        assert_eq!(factory.cert_builds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn instances_are_cached_per_key() {
        let factory = MockProviderFactory::arc();
        let registry = registry(&factory);

        let first = registry.cert_provider("aliyun").await;
        assert!(first.is_ok(), "expected Ok(..), got err {:?}", first.as_ref().err());
        let second = registry.cert_provider("aliyun").await;
        assert!(second.is_ok(), "expected Ok(..), got err {:?}", second.as_ref().err());

        assert_eq!(factory.cert_builds.load(Ordering::SeqCst), 1);
        assert_eq!(factory.cert.validate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn capabilities_are_cached_independently() {
        let factory = MockProviderFactory::arc();
        let registry = registry(&factory);

        let cert = registry.cert_provider("aliyun").await;
        assert!(cert.is_ok(), "expected Ok(..), got err {:?}", cert.as_ref().err());
        let dns = registry.dns_provider("aliyun").await;
        assert!(dns.is_ok(), "expected Ok(..), got err {:?}", dns.as_ref().err());

        assert_eq!(factory.cert_builds.load(Ordering::SeqCst), 1);
        assert_eq!(factory.dns_builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_first_access_constructs_once() {
        let factory = MockProviderFactory::arc();
        factory.cert.validate_delay_ms.store(50, Ordering::SeqCst);
        let registry = Arc::new(registry(&factory));

        let a = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.cert_provider("aliyun").await.is_ok() })
        };
        let b = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.cert_provider("aliyun").await.is_ok() })
        };

        let (a, b) = (a.await, b.await);
        assert_eq!(a.ok(), Some(true));
        assert_eq!(b.ok(), Some(true));
        assert_eq!(factory.cert_builds.load(Ordering::SeqCst), 1);
        assert_eq!(factory.cert.validate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_credentials_fail_and_allow_retry() {
        let factory = MockProviderFactory::arc();
        factory.cert.validate_ok.store(false, Ordering::SeqCst);
        let registry = registry(&factory);

        let res = registry.cert_provider("aliyun").await;
        assert!(
            matches!(&res, Err(CoreError::Provider(_))),
            "unexpected result: {:?}",
            res.as_ref().err()
        );

        // The slot stays empty; once the credentials work, construction is
        // attempted again.
        factory.cert.validate_ok.store(true, Ordering::SeqCst);
        let res = registry.cert_provider("aliyun").await;
        assert!(res.is_ok(), "expected Ok(..), got err {:?}", res.as_ref().err());
        assert_eq!(factory.cert_builds.load(Ordering::SeqCst), 2);
    }
}
