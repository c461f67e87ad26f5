use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::domain::matches_domain;

// ============ Provider Types ============

/// Identifies which cloud platform implementation to use.
///
/// The same closed set serves both capability kinds: a certificate authority
/// and a DNS host may be chosen from it independently per domain. Each
/// variant is gated behind its corresponding feature flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Alibaba Cloud (CAS + AliDNS). Requires feature `aliyun`.
    #[cfg(feature = "aliyun")]
    Aliyun,
    /// Tencent Cloud (SSL + DNSPod). Requires feature `tencent`.
    #[cfg(feature = "tencent")]
    Tencent,
    /// Huawei Cloud (SCM + Cloud DNS). Requires feature `huawei`.
    #[cfg(feature = "huawei")]
    Huawei,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "aliyun")]
            Self::Aliyun => write!(f, "aliyun"),
            #[cfg(feature = "tencent")]
            Self::Tencent => write!(f, "tencent"),
            #[cfg(feature = "huawei")]
            Self::Huawei => write!(f, "huawei"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = UnknownProviderError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            #[cfg(feature = "aliyun")]
            "aliyun" => Ok(Self::Aliyun),
            #[cfg(feature = "tencent")]
            "tencent" => Ok(Self::Tencent),
            #[cfg(feature = "huawei")]
            "huawei" => Ok(Self::Huawei),
            other => Err(UnknownProviderError {
                name: other.to_string(),
            }),
        }
    }
}

/// Error returned when a provider name does not match any enabled variant.
#[derive(Debug, Clone)]
pub struct UnknownProviderError {
    /// The name that failed to resolve.
    pub name: String,
}

impl std::fmt::Display for UnknownProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsupported provider: {}", self.name)
    }
}

impl std::error::Error for UnknownProviderError {}

// ============ Order Types ============

/// Canonical lifecycle state of a certificate order.
///
/// Every vendor adapter maps its native status vocabulary onto this set
/// (see [`status`](crate::status)); the orchestration layer never sees raw
/// vendor codes. States outside the canonical four arrive as
/// [`Unknown`](Self::Unknown) and are treated as transient by callers,
/// which keeps the loop forward-compatible with vocabulary additions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderState {
    /// Waiting for domain-control validation (a DNS challenge is or will be
    /// published).
    DomainVerify,
    /// Validation passed; the CA is producing the certificate.
    Processing,
    /// The certificate has been issued and can be downloaded.
    Issued,
    /// The order failed terminally; a new order is required.
    Failed,
    /// A state this library has no mapping for; carries the raw vendor
    /// value.
    Unknown(String),
}

impl OrderState {
    /// Whether this state ends the order lifecycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Issued | Self::Failed)
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainVerify => write!(f, "domain_verify"),
            Self::Processing => write!(f, "processing"),
            Self::Issued => write!(f, "issued"),
            Self::Failed => write!(f, "failed"),
            Self::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

/// DNS record the CA wants published to prove domain control.
///
/// Only present while an order is in [`OrderState::DomainVerify`]. The
/// record domain may change between polls; callers must compare it against
/// the previously published one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsChallenge {
    /// Record name. Fully qualified (`_dnsauth.www.example.com`) or already
    /// relative (`_dnsauth`) depending on the vendor.
    pub record_domain: String,
    /// Record type, typically `TXT`.
    pub record_type: String,
    /// Record value to publish.
    pub record_value: String,
}

/// Snapshot of a certificate order, as returned by a status poll.
#[derive(Debug, Clone)]
pub struct CertificateStatus {
    /// Vendor-assigned opaque order identifier.
    pub order_id: String,
    /// Canonical lifecycle state.
    pub state: OrderState,
    /// Pending DNS challenge, if the vendor has produced one.
    pub challenge: Option<DnsChallenge>,
}

// ============ Certificate Types ============

/// Downloaded certificate material, PEM encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    /// Leaf certificate.
    pub certificate: String,
    /// Private key.
    pub private_key: String,
    /// Issuer chain, if the vendor hands one out separately.
    pub chain: Option<String>,
}

impl Certificate {
    /// The full chain to serve: the vendor chain when present, otherwise
    /// just the leaf.
    #[must_use]
    pub fn fullchain(&self) -> &str {
        self.chain.as_deref().unwrap_or(&self.certificate)
    }
}

/// A previously issued certificate hosted at the CA.
///
/// Immutable; used only for reuse decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateInfo {
    /// Vendor-assigned certificate identifier.
    pub cert_id: String,
    /// Primary domain the certificate was issued for.
    pub domain: String,
    /// Subject alternative names.
    pub sans: Vec<String>,
    /// Start of the validity window, when the vendor reports it.
    pub not_before: Option<DateTime<Utc>>,
    /// End of the validity window.
    pub not_after: DateTime<Utc>,
}

impl CertificateInfo {
    /// Whole days until `not_after`, negative once expired.
    #[must_use]
    pub fn days_remaining(&self) -> i64 {
        (self.not_after - Utc::now()).num_days()
    }

    /// Whether this certificate covers `target`, by primary domain or any
    /// SAN (exact or single-label wildcard).
    #[must_use]
    pub fn covers(&self, target: &str) -> bool {
        matches_domain(&self.domain, target)
            || self.sans.iter().any(|san| matches_domain(san, target))
    }
}

// ============ DNS Record Types ============

/// A DNS record as published at a DNS host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-specific record identifier.
    pub record_id: String,
    /// Registrable domain (zone) the record lives in.
    pub domain: String,
    /// Sub-label (RR) part, e.g. `_dnsauth.www`.
    pub rr: String,
    /// Record type, e.g. `TXT`.
    pub record_type: String,
    /// Record value.
    pub value: String,
    /// Time to live in seconds.
    pub ttl: u32,
}

// ============ Credential Types ============

/// Alibaba Cloud access credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliyunCredentials {
    /// Access Key ID.
    pub access_key_id: String,
    /// Access Key Secret.
    pub access_key_secret: String,
    /// API region, endpoint default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Tencent Cloud access credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TencentCredentials {
    /// Secret ID.
    pub secret_id: String,
    /// Secret Key.
    pub secret_key: String,
    /// API region, endpoint default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Huawei Cloud access credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuaweiCredentials {
    /// Access Key.
    pub access_key: String,
    /// Secret Key.
    pub secret_key: String,
    /// API region, endpoint default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Project ID, required by some regional endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// Type-safe credential container for all supported platforms.
///
/// Pass this to a [`ProviderFactory`](crate::ProviderFactory) to instantiate
/// capability objects.
///
/// # Serialization
///
/// Serialized as a tagged enum with `"provider"` as the tag and
/// `"credentials"` as the content:
///
/// ```json
/// { "provider": "aliyun", "credentials": { "access_key_id": "...", "access_key_secret": "..." } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum ProviderCredentials {
    /// Alibaba Cloud credentials. Requires feature `aliyun`.
    #[cfg(feature = "aliyun")]
    #[serde(rename = "aliyun")]
    Aliyun(AliyunCredentials),

    /// Tencent Cloud credentials. Requires feature `tencent`.
    #[cfg(feature = "tencent")]
    #[serde(rename = "tencent")]
    Tencent(TencentCredentials),

    /// Huawei Cloud credentials. Requires feature `huawei`.
    #[cfg(feature = "huawei")]
    #[serde(rename = "huawei")]
    Huawei(HuaweiCredentials),
}

impl ProviderCredentials {
    /// Returns the [`ProviderKind`] corresponding to this credential
    /// variant.
    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        match self {
            #[cfg(feature = "aliyun")]
            Self::Aliyun(_) => ProviderKind::Aliyun,
            #[cfg(feature = "tencent")]
            Self::Tencent(_) => ProviderKind::Tencent,
            #[cfg(feature = "huawei")]
            Self::Huawei(_) => ProviderKind::Huawei,
        }
    }
}
