//! 证书生命周期管理器
//!
//! Drives the full acquisition flow per domain: reuse an already issued
//! certificate when possible, otherwise probe the live endpoint, request
//! issuance and walk the order through DNS validation until it terminates.
//! The polling loop keeps no state beyond the order id, so a run that died
//! mid-validation resumes from the externally logged id alone.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use ssl_orchestrator_provider::{CertProvider, DnsProvider, OrderState};

use crate::error::{CoreError, CoreResult};
use crate::services::executor::Executor;
use crate::services::registry::ProviderRegistry;
use crate::services::validator::{CertValidator, RenewalCheck};
use crate::traits::{CertificateStore, Notifier};
use crate::types::{Config, DomainConfig, Event};

/// Consecutive failed status polls tolerated before a run is abandoned.
const MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// Polling cadence of the validation loop.
///
/// The defaults give the CA up to half an hour; tests shrink them to
/// milliseconds.
#[derive(Debug, Clone)]
pub struct PollTiming {
    /// Maximum loop iterations before giving up.
    pub max_attempts: u32,
    /// Wait after a failed poll, a challenge that is not ready yet, or a
    /// failed record write.
    pub retry_wait: Duration,
    /// Wait while the CA verifies a published record or produces the
    /// certificate.
    pub progress_wait: Duration,
    /// Wait on states this build has no mapping for.
    pub unknown_wait: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            retry_wait: Duration::from_secs(10),
            progress_wait: Duration::from_secs(20),
            unknown_wait: Duration::from_secs(15),
        }
    }
}

/// How a single domain run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainOutcome {
    /// An already issued certificate was downloaded from the CA.
    Reused {
        /// The reused certificate.
        cert_id: String,
    },
    /// The served certificate is fine; nothing was done.
    NotDue,
    /// A fresh certificate was issued and stored.
    Issued {
        /// The completed order.
        order_id: String,
    },
}

/// A failed domain within a batch run.
#[derive(Debug, Clone)]
pub struct DomainFailure {
    /// Domain that failed.
    pub domain: String,
    /// Rendered error.
    pub error: String,
}

/// Result of a batch run over all configured domains.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Domains that finished without error.
    pub processed: usize,
    /// Domains that failed, with their errors.
    pub failures: Vec<DomainFailure>,
}

/// 证书管理器
pub struct CertificateManager {
    config: Config,
    registry: Arc<ProviderRegistry>,
    storage: Arc<dyn CertificateStore>,
    validator: Arc<dyn RenewalCheck>,
    executor: Executor,
    notifier: Arc<dyn Notifier>,
    timing: PollTiming,
}

impl CertificateManager {
    /// Creates a manager over a validated configuration and the injected
    /// seams.
    #[must_use]
    pub fn new(
        config: Config,
        registry: Arc<ProviderRegistry>,
        storage: Arc<dyn CertificateStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            registry,
            storage,
            validator: Arc::new(CertValidator::default()),
            executor: Executor::new(),
            notifier,
            timing: PollTiming::default(),
        }
    }

    /// Replaces the endpoint prober (tests, custom probing).
    #[must_use]
    pub fn with_renewal_check(mut self, validator: Arc<dyn RenewalCheck>) -> Self {
        self.validator = validator;
        self
    }

    /// Replaces the polling cadence.
    #[must_use]
    pub fn with_timing(mut self, timing: PollTiming) -> Self {
        self.timing = timing;
        self
    }

    /// 运行证书管理
    ///
    /// Processes every configured domain, fanning out up to `concurrency`
    /// domains at once. One domain's failure is recorded and never aborts
    /// the others.
    pub async fn run(&self, cancel: &CancellationToken) -> CoreResult<BatchOutcome> {
        info!("========== certificate check started ==========");

        let fan_out = self.config.concurrency.max(1);
        let results: Vec<(String, CoreResult<DomainOutcome>)> =
            stream::iter(self.config.domains.iter())
                .map(|domain_config| async move {
                    (
                        domain_config.domain.clone(),
                        self.process_domain(domain_config, cancel).await,
                    )
                })
                .buffer_unordered(fan_out)
                .collect()
                .await;

        let mut outcome = BatchOutcome::default();
        for (domain, result) in results {
            match result {
                Ok(_) => outcome.processed += 1,
                Err(e) => {
                    if e.is_expected() {
                        warn!("processing domain {domain} failed: {e}");
                    } else {
                        log::error!("processing domain {domain} failed: {e}");
                    }
                    outcome.failures.push(DomainFailure {
                        domain,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "========== certificate check finished ({} ok, {} failed) ==========",
            outcome.processed,
            outcome.failures.len()
        );
        Ok(outcome)
    }

    /// 处理单个域名
    pub async fn process_domain(
        &self,
        domain_config: &DomainConfig,
        cancel: &CancellationToken,
    ) -> CoreResult<DomainOutcome> {
        let domain = &domain_config.domain;
        let renew_days = domain_config.renew_days;

        info!("========== processing domain: {domain} ==========");
        info!(
            "  certificate provider: {}, DNS provider: {}",
            domain_config.cert_provider(),
            domain_config.dns_provider()
        );

        let (cert_provider, dns_provider) =
            self.registry.providers_for_domain(domain_config).await?;

        // 1. An already issued certificate with enough lifetime left makes
        //    the whole validation dance unnecessary.
        match cert_provider.find_valid_certificate(domain, renew_days).await {
            Ok(Some(existing)) => {
                info!(
                    "found reusable certificate {} ({} days left)",
                    existing.cert_id,
                    existing.days_remaining()
                );
                match cert_provider.certificate_detail(&existing.cert_id).await {
                    Ok(certificate) => {
                        self.storage.save(domain, &certificate).await?;
                        self.run_hook(domain, domain_config.post_command.as_deref())
                            .await;
                        info!("domain {domain} reused hosted certificate {}", existing.cert_id);
                        return Ok(DomainOutcome::Reused {
                            cert_id: existing.cert_id,
                        });
                    }
                    Err(e) => {
                        warn!("downloading hosted certificate failed: {e}, requesting a new one");
                    }
                }
            }
            Ok(None) => {
                info!("no issued certificate with more than {renew_days} days left");
            }
            Err(e) => warn!("listing hosted certificates failed: {e}"),
        }

        // 2. Probe what the endpoint actually serves.
        let (need_renew, expiry) = self.validator.need_renew(domain, renew_days).await?;
        if !need_renew {
            info!("served certificate for {domain} is fine, nothing to do");
            return Ok(DomainOutcome::NotDue);
        }
        if let Some(expiry) = expiry {
            let days_remaining = (expiry - chrono::Utc::now()).num_days();
            info!("served certificate expires {expiry}, renewal due");
            self.emit(Event::cert_expiring(domain, days_remaining)).await;
        }

        // 3. Fresh order. A rejected request is fatal for this run; the
        //    next scheduled run starts over.
        let order_id = match cert_provider.apply_certificate(domain).await {
            Ok(order_id) => order_id,
            Err(e) => {
                self.emit(Event::cert_failed(domain, &e.to_string())).await;
                return Err(e.into());
            }
        };
        info!("certificate order created, order id: {order_id}");

        // 4.-5. Validation loop, download, persist.
        if let Err(e) = self
            .issue_and_store(&cert_provider, &dns_provider, domain, &order_id, cancel)
            .await
        {
            self.report_failure(domain, &e).await;
            return Err(e);
        }

        // 6. Post command and notification; neither can undo the issuance.
        self.run_hook(domain, domain_config.post_command.as_deref())
            .await;
        self.emit(Event::cert_renewed(domain, &order_id)).await;

        info!("domain {domain} processed");
        Ok(DomainOutcome::Issued { order_id })
    }

    /// 继续处理已存在的订单
    ///
    /// The resume entry point: everything needed is the order id, the
    /// domain and the two provider names — the polling loop re-derives the
    /// rest. Orders already issued skip straight to download.
    pub async fn resume_order(
        &self,
        order_id: &str,
        domain: &str,
        cert_provider_name: &str,
        dns_provider_name: &str,
        cancel: &CancellationToken,
    ) -> CoreResult<()> {
        info!("========== resuming order: {order_id} (domain: {domain}) ==========");

        let cert_provider = self.registry.cert_provider(cert_provider_name).await?;
        let dns_provider = self.registry.dns_provider(dns_provider_name).await?;

        if let Err(e) = self
            .issue_and_store(&cert_provider, &dns_provider, domain, order_id, cancel)
            .await
        {
            self.report_failure(domain, &e).await;
            return Err(e);
        }

        self.run_hook(domain, None).await;
        self.emit(Event::cert_renewed(domain, order_id)).await;

        info!("order {order_id} completed");
        Ok(())
    }

    /// Polls the order to a terminal state, then downloads and persists the
    /// certificate.
    async fn issue_and_store(
        &self,
        cert_provider: &Arc<dyn CertProvider>,
        dns_provider: &Arc<dyn DnsProvider>,
        domain: &str,
        order_id: &str,
        cancel: &CancellationToken,
    ) -> CoreResult<()> {
        self.wait_for_dns_validation(cert_provider, dns_provider, domain, order_id, cancel)
            .await?;

        let certificate = cert_provider.download_certificate(order_id).await?;
        self.storage.save(domain, &certificate).await?;
        Ok(())
    }

    /// 等待 DNS 验证完成
    ///
    /// Walks an order until it terminates. Publishes the validation record
    /// once, re-publishing only when the CA hands out a different label;
    /// repeated upserts for an unchanged challenge would be wasted zone
    /// writes.
    async fn wait_for_dns_validation(
        &self,
        cert_provider: &Arc<dyn CertProvider>,
        dns_provider: &Arc<dyn DnsProvider>,
        domain: &str,
        order_id: &str,
        cancel: &CancellationToken,
    ) -> CoreResult<()> {
        info!("starting domain validation for {domain}...");

        let mut record_added = false;
        let mut last_record_domain = String::new();
        let mut consecutive_errors: u32 = 0;

        for _ in 0..self.timing.max_attempts {
            if cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }

            let status = match cert_provider.certificate_status(order_id).await {
                Ok(status) => {
                    consecutive_errors = 0;
                    status
                }
                Err(e) => {
                    consecutive_errors += 1;
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(CoreError::StatusPolling {
                            attempts: consecutive_errors,
                            source: e,
                        });
                    }
                    warn!("status check failed, retrying shortly: {e}");
                    self.wait(self.timing.retry_wait, cancel).await?;
                    continue;
                }
            };

            debug!("order {order_id} state: {}", status.state);

            match status.state {
                OrderState::DomainVerify => {
                    let challenge = status.challenge.filter(|c| {
                        !c.record_domain.is_empty() && !c.record_value.is_empty()
                    });
                    let Some(challenge) = challenge else {
                        info!("waiting for validation details...");
                        self.wait(self.timing.retry_wait, cancel).await?;
                        continue;
                    };

                    if !record_added || last_record_domain != challenge.record_domain {
                        info!(
                            "publishing validation record: {} {} -> {}",
                            challenge.record_domain, challenge.record_type, challenge.record_value
                        );
                        if let Err(e) = dns_provider
                            .upsert_record(
                                domain,
                                &challenge.record_domain,
                                &challenge.record_type,
                                &challenge.record_value,
                            )
                            .await
                        {
                            warn!("publishing validation record failed, will retry: {e}");
                            self.wait(self.timing.retry_wait, cancel).await?;
                            continue;
                        }
                        record_added = true;
                        last_record_domain = challenge.record_domain;
                    }

                    info!("validation record in place, waiting for the CA...");
                    self.wait(self.timing.progress_wait, cancel).await?;
                }
                OrderState::Processing => {
                    info!("certificate is being issued...");
                    self.wait(self.timing.progress_wait, cancel).await?;
                }
                OrderState::Issued => {
                    info!("certificate issued");
                    return Ok(());
                }
                OrderState::Failed => {
                    return Err(CoreError::IssuanceFailed {
                        order_id: order_id.to_string(),
                    });
                }
                OrderState::Unknown(raw) => {
                    info!("state {raw} not recognized, still waiting...");
                    self.wait(self.timing.unknown_wait, cancel).await?;
                }
            }
        }

        Err(CoreError::ValidationTimeout {
            order_id: order_id.to_string(),
        })
    }

    /// Cancellable backoff. Shutdown during the wait surfaces as
    /// [`CoreError::Cancelled`], immediately.
    async fn wait(&self, duration: Duration, cancel: &CancellationToken) -> CoreResult<()> {
        tokio::select! {
            () = cancel.cancelled() => Err(CoreError::Cancelled),
            () = tokio::time::sleep(duration) => Ok(()),
        }
    }

    /// Runs the applicable post command; failures are logged, never
    /// propagated.
    async fn run_hook(&self, domain: &str, override_command: Option<&str>) {
        let Some(command) = override_command.or(self.config.post_command.as_deref()) else {
            return;
        };

        let vars = Executor::build_vars(
            domain,
            &self.storage.cert_dir(domain),
            &self.storage.cert_path(domain),
            &self.storage.key_path(domain),
            &self.storage.fullchain_path(domain),
        );
        if let Err(e) = self.executor.run_post_command(command, &vars).await {
            warn!("post command for {domain} failed: {e}");
        }
    }

    /// Emits the matching failure event; cancellation stays silent.
    async fn report_failure(&self, domain: &str, error: &CoreError) {
        match error {
            CoreError::Cancelled => {}
            CoreError::ValidationTimeout { order_id } => {
                self.emit(Event::dns_timeout(domain, order_id)).await;
            }
            other => {
                self.emit(Event::cert_failed(domain, &other.to_string()))
                    .await;
            }
        }
    }

    async fn emit(&self, event: Event) {
        if let Err(e) = self.notifier.notify(&event).await {
            warn!("notification delivery failed: {e}");
        }
    }
}
