//! Notification delivery abstraction.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::Event;

/// Outbound notification sink.
///
/// The manager emits an [`Event`] at every lifecycle milestone and logs —
/// never propagates — delivery failures. Retry policy, batching and
/// transport all belong to the implementation.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one event.
    async fn notify(&self, event: &Event) -> CoreResult<()>;
}

/// Notifier that drops every event.
///
/// The default when no notification channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _event: &Event) -> CoreResult<()> {
        Ok(())
    }
}

/// Notifier that writes events to the log, for setups where the log stream
/// is the alerting channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &Event) -> CoreResult<()> {
        log::info!("[event] {} {}: {}", event.event, event.domain, event.message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_notifier_accepts_everything() {
        let notifier = NullNotifier;
        let res = notifier
            .notify(&Event::cert_renewed("www.example.com", "cert-1"))
            .await;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
    }
}
