use crate::config::ProcessorConfig;
use crate::domain::args::payment_intent_id;
use crate::domain::outcome::{IntentStatus, PaymentIntentResult, ProcessorError};
use crate::domain::ports::ProcessorClient;
use crate::domain::selection::PaymentMethodCreateParams;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

const DECLINE_MARKER: &str = "declined";
const DECLINE_CODE: &str = "card_declined";

/// Offline stand-in for a remote processor.
///
/// Payment methods whose id (or create params) mention "declined" are rejected
/// with `card_declined`; everything else succeeds.
#[derive(Clone)]
pub struct SimulatedProcessorClient {
    config: ProcessorConfig,
    latency: Duration,
    calls: Arc<AtomicUsize>,
}

impl SimulatedProcessorClient {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            latency: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of confirmation requests issued so far, shared across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn confirm(
        &self,
        method: &str,
        client_secret: &str,
    ) -> Result<PaymentIntentResult, ProcessorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        info!(
            api_version = %self.config.api_version(),
            account = self.config.account_id.as_deref().unwrap_or("-"),
            "confirming payment intent"
        );
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if method.contains(DECLINE_MARKER) {
            return Err(ProcessorError::Declined(DECLINE_CODE.to_string()));
        }
        Ok(PaymentIntentResult {
            intent_id: payment_intent_id(client_secret)
                .unwrap_or("pi_simulated")
                .to_string(),
            status: IntentStatus::Succeeded,
        })
    }
}

#[async_trait]
impl ProcessorClient for SimulatedProcessorClient {
    async fn confirm_with_existing_method(
        &self,
        payment_method_id: &str,
        client_secret: &str,
    ) -> Result<PaymentIntentResult, ProcessorError> {
        self.confirm(payment_method_id, client_secret).await
    }

    async fn confirm_with_new_method(
        &self,
        create_params: &PaymentMethodCreateParams,
        client_secret: &str,
    ) -> Result<PaymentIntentResult, ProcessorError> {
        self.confirm(&create_params.as_json().to_string(), client_secret)
            .await
    }
}
