//! Configuration types.
//!
//! The core only defines the shapes; reading and parsing a configuration
//! file is the embedding application's job (serde makes any self-describing
//! format work).

use serde::{Deserialize, Serialize};
use ssl_orchestrator_provider::{
    AliyunCredentials, HuaweiCredentials, ProviderCredentials, ProviderKind, TencentCredentials,
};

use crate::error::{CoreError, CoreResult};

/// 云平台凭证配置
///
/// One optional entry per supported platform; a domain referencing a
/// platform without credentials fails validation before anything goes
/// online.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Alibaba Cloud credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliyun: Option<AliyunCredentials>,
    /// Tencent Cloud credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tencent: Option<TencentCredentials>,
    /// Huawei Cloud credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub huawei: Option<HuaweiCredentials>,
}

impl ProvidersConfig {
    /// Credentials configured for a platform, if any.
    #[must_use]
    pub fn credentials_for(&self, kind: ProviderKind) -> Option<ProviderCredentials> {
        match kind {
            ProviderKind::Aliyun => self.aliyun.clone().map(ProviderCredentials::Aliyun),
            ProviderKind::Tencent => self.tencent.clone().map(ProviderCredentials::Tencent),
            ProviderKind::Huawei => self.huawei.clone().map(ProviderCredentials::Huawei),
        }
    }
}

/// 域名配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Managed host name.
    pub domain: String,

    /// 简单模式：证书和 DNS 使用同一平台
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// 混合模式：证书和 DNS 使用不同平台
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_provider: Option<String>,
    /// DNS platform override for mixed mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_provider: Option<String>,

    /// Renew when fewer than this many days of validity remain. Must be
    /// greater than zero.
    pub renew_days: u32,

    /// Per-domain post command, overrides the global one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_command: Option<String>,
}

impl DomainConfig {
    /// Certificate platform name for this domain
    /// (`cert_provider` → `provider` → `"aliyun"`).
    #[must_use]
    pub fn cert_provider(&self) -> &str {
        self.cert_provider
            .as_deref()
            .or(self.provider.as_deref())
            .unwrap_or("aliyun")
    }

    /// DNS platform name for this domain
    /// (`dns_provider` → `provider` → `"aliyun"`).
    #[must_use]
    pub fn dns_provider(&self) -> &str {
        self.dns_provider
            .as_deref()
            .or(self.provider.as_deref())
            .unwrap_or("aliyun")
    }
}

/// 全局配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Platform credentials.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Managed domains.
    pub domains: Vec<DomainConfig>,

    /// 全局后置命令
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_command: Option<String>,

    /// How many domains to process at once. Defaults to 1 (sequential).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    1
}

impl Config {
    /// Checks the configuration before anything goes online: at least one
    /// domain, positive renewal thresholds, known provider names, and
    /// credentials present for every referenced platform.
    pub fn validate(&self) -> CoreResult<()> {
        if self.domains.is_empty() {
            return Err(CoreError::Validation("no domains configured".into()));
        }

        for domain in &self.domains {
            if domain.renew_days == 0 {
                return Err(CoreError::Validation(format!(
                    "domain {}: renew_days must be greater than 0",
                    domain.domain
                )));
            }

            for (role, name) in [
                ("certificate", domain.cert_provider()),
                ("DNS", domain.dns_provider()),
            ] {
                let kind: ProviderKind = name.parse().map_err(|e| {
                    CoreError::Configuration(format!("domain {}: {e}", domain.domain))
                })?;
                if self.providers.credentials_for(kind).is_none() {
                    return Err(CoreError::Configuration(format!(
                        "domain {}: {role} provider {name} has no credentials configured",
                        domain.domain
                    )));
                }
            }
        }

        Ok(())
    }
}
