use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Certificate, CertificateInfo, CertificateStatus, DnsRecord};

/// 证书提供商 Trait
///
/// One implementation per cloud platform. Status vocabulary mapping is the
/// implementation's responsibility (see [`status`](crate::status)); callers
/// only ever observe [`OrderState`](crate::OrderState) values.
#[async_trait]
pub trait CertProvider: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// 验证凭证是否有效
    ///
    /// Called once by the registry before the instance is handed out.
    async fn validate_credentials(&self) -> Result<bool>;

    /// Requests issuance of a DV certificate for `domain`.
    ///
    /// Returns the vendor-assigned order identifier. The order id is the
    /// only state a caller needs to retain; the whole validation flow can be
    /// re-derived from it.
    async fn apply_certificate(&self, domain: &str) -> Result<String>;

    /// Polls the current state of an order.
    ///
    /// While the order is in `DomainVerify` the snapshot carries the DNS
    /// challenge to publish, once the vendor has produced one.
    async fn certificate_status(&self, order_id: &str) -> Result<CertificateStatus>;

    /// Downloads the issued certificate for an order.
    ///
    /// Fails with [`CertificateNotReady`](crate::ProviderError::CertificateNotReady)
    /// when the order has not reached the issued state.
    async fn download_certificate(&self, order_id: &str) -> Result<Certificate>;

    /// Lists certificates already issued and hosted at this CA.
    async fn list_certificates(&self) -> Result<Vec<CertificateInfo>>;

    /// Finds an already issued certificate covering `domain` with more than
    /// `min_days` of validity left.
    ///
    /// The default implementation scans [`list_certificates`](Self::list_certificates)
    /// and picks the longest-lived match. Implementations may override it
    /// with a native filtered query.
    async fn find_valid_certificate(
        &self,
        domain: &str,
        min_days: u32,
    ) -> Result<Option<CertificateInfo>> {
        let certificates = self.list_certificates().await?;
        Ok(certificates
            .into_iter()
            .filter(|c| c.covers(domain))
            .filter(|c| c.days_remaining() > i64::from(min_days))
            .max_by_key(|c| c.not_after))
    }

    /// Downloads certificate material by certificate id (reuse path).
    async fn certificate_detail(&self, cert_id: &str) -> Result<Certificate>;
}

/// DNS 提供商 Trait
///
/// Record names may be passed fully qualified or already relative;
/// implementations normalize with [`main_domain`](crate::utils::domain::main_domain)
/// and [`sub_domain`](crate::utils::domain::sub_domain) before talking to
/// the vendor API.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// 验证凭证是否有效
    async fn validate_credentials(&self) -> Result<bool>;

    /// Publishes a record, updating in place when a record with the same
    /// (label, type) already exists.
    ///
    /// Implementations must search for an existing record first rather than
    /// create a duplicate; validation challenges get re-published with new
    /// values and duplicated TXT records make vendors reject the zone write
    /// or the CA see stale data.
    async fn upsert_record(
        &self,
        domain: &str,
        rr: &str,
        record_type: &str,
        value: &str,
    ) -> Result<DnsRecord>;

    /// Rewrites an existing record identified by `record_id`.
    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        rr: &str,
        record_type: &str,
        value: &str,
    ) -> Result<DnsRecord>;

    /// Deletes a record by id.
    async fn delete_record(&self, domain: &str, record_id: &str) -> Result<()>;

    /// Looks up a record by (label, type).
    async fn find_record(
        &self,
        domain: &str,
        rr: &str,
        record_type: &str,
    ) -> Result<Option<DnsRecord>>;

    /// Lists all records in the zone of `domain`.
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>>;
}
