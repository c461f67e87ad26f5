//! Notification event payloads.
//!
//! The manager emits these at lifecycle milestones; delivering them (HTTP
//! webhook, chat bot, mail, ...) is the [`Notifier`](crate::Notifier)
//! implementation's concern, including its own retry policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A served certificate is approaching expiry and renewal is due.
    CertExpiring,
    /// A certificate was issued or reissued and persisted.
    CertRenewed,
    /// An issuance attempt failed terminally.
    CertFailed,
    /// Domain validation polling exhausted its window.
    DnsTimeout,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CertExpiring => write!(f, "cert_expiring"),
            Self::CertRenewed => write!(f, "cert_renewed"),
            Self::CertFailed => write!(f, "cert_failed"),
            Self::DnsTimeout => write!(f, "dns_timeout"),
        }
    }
}

/// 事件数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// What happened.
    pub event: EventKind,
    /// Domain the event relates to.
    pub domain: String,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Human-readable summary.
    pub message: String,
    /// Structured extras (order id, days remaining, failure reason, ...).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

impl Event {
    fn new(event: EventKind, domain: &str, message: String, data: serde_json::Value) -> Self {
        Self {
            event,
            domain: domain.to_string(),
            timestamp: Utc::now(),
            message,
            data,
        }
    }

    /// A served certificate is about to expire.
    #[must_use]
    pub fn cert_expiring(domain: &str, days_remaining: i64) -> Self {
        Self::new(
            EventKind::CertExpiring,
            domain,
            format!("certificate for {domain} expires in {days_remaining} days"),
            json!({ "days_remaining": days_remaining }),
        )
    }

    /// A certificate was issued (or an existing one reused) and saved.
    #[must_use]
    pub fn cert_renewed(domain: &str, reference: &str) -> Self {
        Self::new(
            EventKind::CertRenewed,
            domain,
            format!("certificate for {domain} issued"),
            json!({ "reference": reference }),
        )
    }

    /// An issuance attempt failed.
    #[must_use]
    pub fn cert_failed(domain: &str, reason: &str) -> Self {
        Self::new(
            EventKind::CertFailed,
            domain,
            format!("certificate request for {domain} failed"),
            json!({ "reason": reason }),
        )
    }

    /// Validation polling ran out of attempts; the order id allows a later
    /// resume.
    #[must_use]
    pub fn dns_timeout(domain: &str, order_id: &str) -> Self {
        Self::new(
            EventKind::DnsTimeout,
            domain,
            format!("DNS validation for {domain} timed out"),
            json!({ "order_id": order_id }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_serializes_snake_case() {
        let res = serde_json::to_string(&EventKind::DnsTimeout);
        assert!(res.is_ok(), "serialization failed: {res:?}");
        let Ok(json) = res else {
            return;
        };
        assert_eq!(json, "\"dns_timeout\"");
    }

    #[test]
    fn cert_expiring_payload() {
        let event = Event::cert_expiring("www.example.com", 7);
        assert_eq!(event.event, EventKind::CertExpiring);
        assert_eq!(event.domain, "www.example.com");
        assert_eq!(event.data["days_remaining"], 7);
        assert!(event.message.contains("7 days"));
    }

    #[test]
    fn dns_timeout_carries_order_id() {
        let event = Event::dns_timeout("www.example.com", "ord-42");
        assert_eq!(event.data["order_id"], "ord-42");
    }

    #[test]
    fn event_serde_round_trip() {
        let event = Event::cert_failed("www.example.com", "order rejected");
        let json_res = serde_json::to_string(&event);
        assert!(json_res.is_ok(), "serialization failed: {json_res:?}");
        let Ok(json) = json_res else {
            return;
        };
        let back_res: serde_json::Result<Event> = serde_json::from_str(&json);
        assert!(back_res.is_ok(), "deserialization failed: {back_res:?}");
        let Ok(back) = back_res else {
            return;
        };
        assert_eq!(back.event, EventKind::CertFailed);
        assert_eq!(back.data["reason"], "order rejected");
    }
}
