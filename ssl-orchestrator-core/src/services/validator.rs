//! 线上证书探测
//!
//! Connects to the live endpoint and inspects whatever certificate it
//! serves. The peer chain is deliberately not verified: an expired or
//! self-signed certificate is exactly the situation that must be observed,
//! not rejected.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::error::CoreResult;

#[cfg(feature = "rustls")]
use std::sync::Arc;

#[cfg(feature = "rustls")]
use chrono::TimeZone;
#[cfg(feature = "rustls")]
use log::{debug, trace};
#[cfg(feature = "rustls")]
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
#[cfg(feature = "rustls")]
use rustls::crypto::CryptoProvider;
#[cfg(feature = "rustls")]
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
#[cfg(feature = "rustls")]
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
#[cfg(feature = "rustls")]
use ssl_orchestrator_provider::utils::domain::matches_domain;
#[cfg(feature = "rustls")]
use tokio::net::TcpStream;
#[cfg(feature = "rustls")]
use tokio::time::timeout;
#[cfg(feature = "rustls")]
use tokio_rustls::TlsConnector;
#[cfg(feature = "rustls")]
use x509_parser::prelude::*;

#[cfg(feature = "rustls")]
use crate::error::CoreError;

// 超时配置常量
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const TLS_TIMEOUT: Duration = Duration::from_secs(5);

/// Decides whether a domain's served certificate warrants renewal.
///
/// Split out as a trait so the manager can be exercised without opening
/// sockets.
#[async_trait]
pub trait RenewalCheck: Send + Sync {
    /// Whether renewal is needed, along with the served certificate's
    /// expiry when it could be read.
    ///
    /// A failed probe always means "needs renewal" with no expiry; an
    /// unreachable or broken endpoint must never block issuance.
    async fn need_renew(
        &self,
        domain: &str,
        renew_days: u32,
    ) -> CoreResult<(bool, Option<DateTime<Utc>>)>;
}

/// TLS endpoint prober.
pub struct CertValidator {
    /// Port probed on the target host.
    pub port: u16,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// TLS handshake timeout.
    pub tls_timeout: Duration,
}

impl Default for CertValidator {
    fn default() -> Self {
        Self {
            port: 443,
            connect_timeout: CONNECT_TIMEOUT,
            tls_timeout: TLS_TIMEOUT,
        }
    }
}

/// 初始化 rustls CryptoProvider（仅初始化一次）
#[cfg(feature = "rustls")]
fn ensure_crypto_provider() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // A host application may already have installed one; that is fine.
        let _ = CryptoProvider::install_default(rustls::crypto::ring::default_provider());
    });
}

/// Verifier that accepts any peer chain.
///
/// The probe introspects whatever is served, including self-signed and
/// expired material; signatures are still checked so a broken handshake
/// does not yield garbage.
#[cfg(feature = "rustls")]
#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

#[cfg(feature = "rustls")]
impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(feature = "rustls")]
impl CertValidator {
    /// Reads the served leaf certificate's expiry and covered names
    /// (common name plus subject alternative names).
    pub async fn check_cert_expiry(
        &self,
        domain: &str,
    ) -> CoreResult<(DateTime<Utc>, Vec<String>)> {
        ensure_crypto_provider();

        trace!("[probe] connecting to {}:{}", domain, self.port);
        let stream = timeout(
            self.connect_timeout,
            TcpStream::connect((domain, self.port)),
        )
        .await
        .map_err(|_| CoreError::Network(format!("connection to {domain}:{} timed out", self.port)))?
        .map_err(|e| CoreError::Network(format!("connection to {domain}:{} failed: {e}", self.port)))?;

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert { provider }))
            .with_no_client_auth();
        let connector = TlsConnector::from(Arc::new(config));

        let server_name = ServerName::try_from(domain.to_string())
            .map_err(|_| CoreError::Validation(format!("invalid domain name: {domain}")))?;

        let tls_stream = timeout(self.tls_timeout, connector.connect(server_name, stream))
            .await
            .map_err(|_| CoreError::Network(format!("TLS handshake with {domain} timed out")))?
            .map_err(|e| CoreError::Network(format!("TLS handshake with {domain} failed: {e}")))?;

        let (_, tls_conn) = tls_stream.get_ref();
        let cert_der = tls_conn
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| CoreError::Network(format!("{domain} served no certificate")))?;

        let (_, cert) = X509Certificate::from_der(cert_der.as_ref())
            .map_err(|e| CoreError::Network(format!("certificate parsing failed: {e}")))?;

        let not_after = Utc
            .timestamp_opt(cert.validity().not_after.timestamp(), 0)
            .single()
            .ok_or_else(|| CoreError::Network("certificate carries no usable expiry".into()))?;

        // 收集证书覆盖的所有域名（CN + SAN）
        let mut names: Vec<String> = cert
            .subject()
            .iter_common_name()
            .filter_map(|cn| cn.as_str().ok())
            .map(String::from)
            .collect();
        if let Ok(Some(ext)) = cert.subject_alternative_name() {
            names.extend(ext.value.general_names.iter().filter_map(|name| match name {
                x509_parser::extensions::GeneralName::DNSName(dns) => Some((*dns).to_string()),
                _ => None,
            }));
        }

        debug!(
            "[probe] {}:{} serves a certificate for {:?}, not_after={}",
            domain, self.port, names, not_after
        );

        Ok((not_after, names))
    }
}

#[cfg(feature = "rustls")]
#[async_trait]
impl RenewalCheck for CertValidator {
    async fn need_renew(
        &self,
        domain: &str,
        renew_days: u32,
    ) -> CoreResult<(bool, Option<DateTime<Utc>>)> {
        let (expiry, names) = match self.check_cert_expiry(domain).await {
            Ok(probed) => probed,
            Err(e) => {
                log::warn!("probing {domain} failed: {e}, a new certificate will be requested");
                return Ok((true, None));
            }
        };

        if !names.iter().any(|name| matches_domain(name, domain)) {
            log::info!(
                "served certificate does not cover {domain} (covers {names:?}), renewal needed"
            );
            return Ok((true, Some(expiry)));
        }

        let days_remaining = (expiry - Utc::now()).num_days();
        log::info!("certificate for {domain} expires in {days_remaining} days ({expiry})");

        Ok((days_remaining <= i64::from(renew_days), Some(expiry)))
    }
}

/// 无 rustls 支持时的探测实现（返回错误）
#[cfg(not(feature = "rustls"))]
#[async_trait]
impl RenewalCheck for CertValidator {
    async fn need_renew(
        &self,
        _domain: &str,
        _renew_days: u32,
    ) -> CoreResult<(bool, Option<DateTime<Utc>>)> {
        Err(crate::error::CoreError::Validation(
            "endpoint probing requires the rustls feature".to_string(),
        ))
    }
}
