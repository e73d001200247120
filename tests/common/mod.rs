#![allow(dead_code)]

use async_trait::async_trait;
use paysheet::application::controller::FlowController;
use paysheet::application::handle::{FlowEvent, FlowHandle};
use paysheet::config::FlowSettings;
use paysheet::domain::args::FlowArgs;
use paysheet::domain::outcome::{IntentStatus, PaymentIntentResult, ProcessorError};
use paysheet::domain::ports::ProcessorClient;
use paysheet::domain::presentation::PresentationState;
use paysheet::domain::selection::PaymentMethodCreateParams;
use paysheet::interfaces::console::{ChannelPresentation, PresentationCall};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Semaphore, broadcast, mpsc};

pub const CLIENT_SECRET: &str = "secret_abc";

/// Processor double recording `(method, client_secret)` pairs.
#[derive(Clone, Default)]
pub struct FakeProcessor {
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
    decline: Option<String>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeProcessor {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn declining(code: &str) -> Self {
        Self {
            decline: Some(code.to_string()),
            ..Self::default()
        }
    }

    /// Every call waits for a permit on the returned semaphore.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn respond(
        &self,
        method: String,
        client_secret: &str,
    ) -> Result<PaymentIntentResult, ProcessorError> {
        self.calls
            .lock()
            .unwrap()
            .push((method, client_secret.to_string()));
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        match &self.decline {
            Some(code) => Err(ProcessorError::Declined(code.clone())),
            None => Ok(PaymentIntentResult {
                intent_id: "pi_test".to_string(),
                status: IntentStatus::Succeeded,
            }),
        }
    }
}

#[async_trait]
impl ProcessorClient for FakeProcessor {
    async fn confirm_with_existing_method(
        &self,
        payment_method_id: &str,
        client_secret: &str,
    ) -> Result<PaymentIntentResult, ProcessorError> {
        self.respond(payment_method_id.to_string(), client_secret)
            .await
    }

    async fn confirm_with_new_method(
        &self,
        create_params: &PaymentMethodCreateParams,
        client_secret: &str,
    ) -> Result<PaymentIntentResult, ProcessorError> {
        self.respond(create_params.as_json().to_string(), client_secret)
            .await
    }
}

pub struct Session {
    pub handle: FlowHandle,
    pub events: broadcast::Receiver<FlowEvent>,
    pub calls: mpsc::UnboundedReceiver<PresentationCall>,
}

impl Session {
    /// Waits for the first event matching `pred`, skipping others.
    pub async fn wait_for(&mut self, pred: impl Fn(&FlowEvent) -> bool) -> FlowEvent {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let event = self.events.recv().await.expect("event stream closed");
                if pred(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("timed out waiting for flow event")
    }

    pub fn drain_calls(&mut self) -> Vec<PresentationCall> {
        let mut calls = Vec::new();
        while let Ok(call) = self.calls.try_recv() {
            calls.push(call);
        }
        calls
    }
}

pub fn instant_settings() -> FlowSettings {
    FlowSettings {
        presentation_delay_ms: 0,
        ..FlowSettings::default()
    }
}

pub fn controller(processor: FakeProcessor, args: Option<FlowArgs>) -> (FlowController, mpsc::UnboundedReceiver<PresentationCall>) {
    let (presentation, calls) = ChannelPresentation::new();
    let mut controller = FlowController::new(
        Box::new(processor),
        Box::new(presentation),
        instant_settings(),
    );
    if let Some(args) = args {
        controller = controller.with_args(args);
    }
    (controller, calls)
}

/// Starts a session and waits until the sheet is visible.
pub async fn start_visible(processor: FakeProcessor, args: Option<FlowArgs>) -> Session {
    let (controller, calls) = controller(processor, args);
    start(controller, calls).await
}

pub async fn start(
    controller: FlowController,
    calls: mpsc::UnboundedReceiver<PresentationCall>,
) -> Session {
    let events = controller.subscribe_events();
    let handle = controller.start();
    let mut session = Session {
        handle,
        events,
        calls,
    };
    session
        .wait_for(|e| *e == FlowEvent::PresentationRequested(PresentationState::Visible))
        .await;
    session
}

pub fn args() -> FlowArgs {
    FlowArgs::new(CLIENT_SECRET).unwrap()
}

pub fn is_error(event: &FlowEvent) -> bool {
    matches!(event, FlowEvent::Error(_))
}
