use serde::{Deserialize, Serialize};

/// Unified error type for all certificate-authority and DNS provider
/// operations.
///
/// Each variant includes a `provider` field identifying which provider
/// produced the error, plus variant-specific context. All variants are
/// serializable for structured error reporting.
///
/// # Retryable Errors
///
/// The following variants represent transient failures that may succeed on
/// retry:
/// - [`NetworkError`](Self::NetworkError) — network connectivity issues
/// - [`Timeout`](Self::Timeout) — request timed out
/// - [`RateLimited`](Self::RateLimited) — API rate limit exceeded
///
/// The polling loop in the core counts consecutive failures of any kind and
/// aborts after three; [`is_retryable`](Self::is_retryable) is for callers
/// that want to retry a single vendor call locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection
    /// refused, etc.).
    NetworkError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The API rate limit has been exceeded (HTTP 429 or equivalent).
    RateLimited {
        /// Provider that produced the error.
        provider: String,
        /// Suggested wait time in seconds before retrying, if provided by
        /// the API.
        retry_after: Option<u64>,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The provided credentials are invalid or expired.
    InvalidCredentials {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The specified certificate order was not found.
    OrderNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Order identifier that was not found.
        order_id: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The requested certificate content is not available yet (order not in
    /// an issued state).
    CertificateNotReady {
        /// Provider that produced the error.
        provider: String,
        /// Order identifier the download was attempted for.
        order_id: String,
        /// Raw vendor state at the time of the attempt.
        state: String,
    },

    /// The specified DNS record was not found.
    RecordNotFound {
        /// Provider that produced the error.
        provider: String,
        /// ID of the record that was not found.
        record_id: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The specified domain/zone was not found.
    DomainNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Domain name that was not found.
        domain: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The authenticated user lacks permission for the requested operation.
    PermissionDenied {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// Failed to parse the provider's API response.
    ParseError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// An unrecognized error from the provider API.
    ///
    /// This is a catch-all for error codes not yet mapped to a specific
    /// variant.
    Unknown {
        /// Provider that produced the error.
        provider: String,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// 是否为可重试的瞬态错误（网络、超时、限流）。
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::OrderNotFound { .. }
                | Self::CertificateNotReady { .. }
                | Self::RecordNotFound { .. }
                | Self::DomainNotFound { .. }
                | Self::PermissionDenied { .. }
        )
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::RateLimited {
                provider,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{provider}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{provider}] Rate limited")
                }
            }
            Self::InvalidCredentials {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{provider}] Invalid credentials")
                }
            }
            Self::OrderNotFound {
                provider, order_id, ..
            } => {
                write!(f, "[{provider}] Order '{order_id}' not found")
            }
            Self::CertificateNotReady {
                provider,
                order_id,
                state,
            } => {
                write!(
                    f,
                    "[{provider}] Certificate for order '{order_id}' not issued yet (state: {state})"
                )
            }
            Self::RecordNotFound {
                provider,
                record_id,
                ..
            } => {
                write!(f, "[{provider}] Record '{record_id}' not found")
            }
            Self::DomainNotFound {
                provider,
                domain,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Domain '{domain}' not found: {msg}")
                } else {
                    write!(f, "[{provider}] Domain '{domain}' not found")
                }
            }
            Self::PermissionDenied {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Permission denied: {msg}")
                } else {
                    write!(f, "[{provider}] Permission denied")
                }
            }
            Self::ParseError { provider, detail } => {
                write!(f, "[{provider}] Parse error: {detail}")
            }
            Self::Unknown {
                provider,
                raw_message,
                ..
            } => {
                write!(f, "[{provider}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_network_error() {
        let e = ProviderError::NetworkError {
            provider: "test".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(e.to_string(), "[test] Network error: connection refused");
    }

    #[test]
    fn display_invalid_credentials_with_message() {
        let e = ProviderError::InvalidCredentials {
            provider: "aliyun".to_string(),
            raw_message: Some("bad key".to_string()),
        };
        assert_eq!(e.to_string(), "[aliyun] Invalid credentials: bad key");
    }

    #[test]
    fn display_order_not_found() {
        let e = ProviderError::OrderNotFound {
            provider: "tencent".to_string(),
            order_id: "ord-123".to_string(),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[tencent] Order 'ord-123' not found");
    }

    #[test]
    fn display_certificate_not_ready() {
        let e = ProviderError::CertificateNotReady {
            provider: "aliyun".to_string(),
            order_id: "42".to_string(),
            state: "domain_verify".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "[aliyun] Certificate for order '42' not issued yet (state: domain_verify)"
        );
    }

    #[test]
    fn display_rate_limited_with_retry() {
        let e = ProviderError::RateLimited {
            provider: "huawei".to_string(),
            retry_after: Some(30),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[huawei] Rate limited (retry after 30s)");
    }

    #[test]
    fn retryable_variants() {
        assert!(
            ProviderError::NetworkError {
                provider: "t".into(),
                detail: "x".into(),
            }
            .is_retryable()
        );
        assert!(
            ProviderError::Timeout {
                provider: "t".into(),
                detail: "x".into(),
            }
            .is_retryable()
        );
        assert!(
            ProviderError::RateLimited {
                provider: "t".into(),
                retry_after: None,
                raw_message: None,
            }
            .is_retryable()
        );
        assert!(
            !ProviderError::InvalidCredentials {
                provider: "t".into(),
                raw_message: None,
            }
            .is_retryable()
        );
        assert!(
            !ProviderError::OrderNotFound {
                provider: "t".into(),
                order_id: "1".into(),
                raw_message: None,
            }
            .is_retryable()
        );
    }

    #[test]
    fn expected_variants() {
        assert!(
            ProviderError::InvalidCredentials {
                provider: "t".into(),
                raw_message: None,
            }
            .is_expected()
        );
        assert!(
            !ProviderError::ParseError {
                provider: "t".into(),
                detail: "bad json".into(),
            }
            .is_expected()
        );
    }

    #[test]
    fn serialize_json_round_trip() {
        let original = ProviderError::RateLimited {
            provider: "aliyun".to_string(),
            retry_after: Some(60),
            raw_message: Some("too many requests".to_string()),
        };
        let json_res = serde_json::to_string(&original);
        assert!(json_res.is_ok(), "serialization failed: {json_res:?}");
        let Ok(json) = json_res else {
            return;
        };
        assert!(json.contains("\"code\":\"RateLimited\""));

        let back_res: serde_json::Result<ProviderError> = serde_json::from_str(&json);
        assert!(back_res.is_ok(), "deserialization failed: {back_res:?}");
        let Ok(back) = back_res else {
            return;
        };
        assert_eq!(back.to_string(), original.to_string());
    }
}
