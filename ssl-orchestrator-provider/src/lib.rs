//! # ssl-orchestrator-provider
//!
//! Capability abstraction for cloud-hosted DV certificate issuance and DNS
//! validation records.
//!
//! ## Supported Platforms
//!
//! | Platform | Feature Flag | Certificate API | DNS API |
//! |----------|-------------|-----------------|---------|
//! | [Alibaba Cloud](https://www.aliyun.com/) | `aliyun` | CAS | AliDNS |
//! | [Tencent Cloud](https://cloud.tencent.com/) | `tencent` | SSL | DNSPod |
//! | [Huawei Cloud](https://www.huaweicloud.com/) | `huawei` | SCM | Cloud DNS |
//!
//! The crate defines the two capability contracts ([`CertProvider`],
//! [`DnsProvider`]), their data records, the canonical [`OrderState`]
//! vocabulary with the per-platform mapping tables ([`status`]), the typed
//! credential model and the [`ProviderFactory`] construction seam. The
//! concrete HTTP adapters live in per-platform crates that implement the
//! traits and plug in through a factory.
//!
//! ## Feature Flags
//!
//! - **`all-providers`** *(default)* — Enable all platform variants above.
//! - **`aliyun`** / **`tencent`** / **`huawei`** — Enable a single platform.
//!
//! ## Order lifecycle
//!
//! Every vendor reports issuance progress in its own vocabulary; adapters
//! map it onto the closed canonical set before anything else sees it:
//!
//! ```text
//! apply_certificate ──▶ DomainVerify ──▶ Processing ──▶ Issued
//!                            │                            │
//!                            └────────▶ Failed ◀──────────┘
//! ```
//!
//! States without a mapping surface as [`OrderState::Unknown`] and are
//! treated as transient by callers, so a vendor adding vocabulary never
//! breaks a deployed poller.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ssl_orchestrator_provider::{
//!     AliyunCredentials, CertProvider, ProviderCredentials, ProviderFactory,
//! };
//!
//! async fn example(factory: Arc<dyn ProviderFactory>) -> ssl_orchestrator_provider::Result<()> {
//!     let credentials = ProviderCredentials::Aliyun(AliyunCredentials {
//!         access_key_id: "your-key-id".to_string(),
//!         access_key_secret: "your-key-secret".to_string(),
//!         region: None,
//!     });
//!
//!     let ca = factory.cert_provider(&credentials)?;
//!     ca.validate_credentials().await?;
//!
//!     let order_id = ca.apply_certificate("www.example.com").await?;
//!     let status = ca.certificate_status(&order_id).await?;
//!     println!("{order_id}: {}", status.state);
//!     Ok(())
//! }
//! ```

mod error;
mod factory;
pub mod status;
mod traits;
mod types;
pub mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export the construction seam
pub use factory::ProviderFactory;

// Re-export capability traits
pub use traits::{CertProvider, DnsProvider};

// Re-export types
pub use types::{
    AliyunCredentials, Certificate, CertificateInfo, CertificateStatus, DnsChallenge, DnsRecord,
    HuaweiCredentials, OrderState, ProviderCredentials, ProviderKind, TencentCredentials,
    UnknownProviderError,
};
