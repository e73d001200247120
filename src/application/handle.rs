use crate::domain::outcome::{
    ConfirmationOutcome, ErrorNotification, PaymentIntentResult, ProcessorError,
};
use crate::domain::presentation::{DismissReason, EndReason, PresentationState, SessionPhase};
use crate::domain::selection::{PaymentSelection, SelectionSubscription};
use crate::domain::transition::{ScreenId, TransitionTarget};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Everything the flow reports to observers, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    PresentationRequested(PresentationState),
    ScreenShown(ScreenId),
    ConfirmationStarted,
    ConfirmationSucceeded,
    Error(ErrorNotification),
    Ended(EndReason),
}

/// Point-in-time view of the controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSnapshot {
    pub phase: SessionPhase,
    pub presentation: PresentationState,
    pub active_screen: ScreenId,
    pub back_stack: Vec<TransitionTarget>,
    pub selection: Option<PaymentSelection>,
    pub confirmation_pending: bool,
}

impl FlowSnapshot {
    /// Whether the buy button should accept taps.
    pub fn confirm_enabled(&self) -> bool {
        self.phase == SessionPhase::Visible
            && self.selection.is_some()
            && !self.confirmation_pending
    }
}

pub(crate) enum FlowCommand {
    SetSelection(Option<PaymentSelection>),
    RequestTransition(TransitionTarget),
    RequestBack,
    RequestConfirm,
    Dismiss(DismissReason),
    PresentationReached(PresentationState),
    PresentationDelayElapsed,
    ConfirmationResolved(ConfirmationOutcome),
    ProcessorResult(Result<PaymentIntentResult, ProcessorError>),
    Teardown,
    Snapshot(oneshot::Sender<FlowSnapshot>),
    SubscribeSelection(oneshot::Sender<SelectionSubscription>),
    SubscribeTransitions(oneshot::Sender<broadcast::Receiver<TransitionTarget>>),
    WhenSettled(oneshot::Sender<()>),
}

/// Command and observation surface of a running flow session.
///
/// Every command is a no-op once the session has ended.
#[derive(Clone)]
pub struct FlowHandle {
    commands: mpsc::UnboundedSender<FlowCommand>,
    events: broadcast::Sender<FlowEvent>,
    ended: watch::Receiver<bool>,
}

impl FlowHandle {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<FlowCommand>,
        events: broadcast::Sender<FlowEvent>,
        ended: watch::Receiver<bool>,
    ) -> Self {
        Self {
            commands,
            events,
            ended,
        }
    }

    fn send(&self, command: FlowCommand) {
        // The actor is gone once the session ended.
        let _ = self.commands.send(command);
    }

    pub fn set_selection(&self, selection: Option<PaymentSelection>) {
        self.send(FlowCommand::SetSelection(selection));
    }

    pub fn request_transition(&self, target: TransitionTarget) {
        self.send(FlowCommand::RequestTransition(target));
    }

    pub fn request_back(&self) {
        self.send(FlowCommand::RequestBack);
    }

    pub fn request_confirm(&self) {
        self.send(FlowCommand::RequestConfirm);
    }

    pub fn request_dismiss(&self) {
        self.send(FlowCommand::Dismiss(DismissReason::Explicit));
    }

    /// The user tapped outside the sheet.
    pub fn user_dismiss_tapped(&self) {
        self.send(FlowCommand::Dismiss(DismissReason::TapOutside));
    }

    /// The presentation layer finished animating to `state`.
    pub fn presentation_reached(&self, state: PresentationState) {
        self.send(FlowCommand::PresentationReached(state));
    }

    /// A processor result that arrived out of band, e.g. after an
    /// authentication step handled outside the sheet.
    pub fn deliver_processor_result(&self, result: Result<PaymentIntentResult, ProcessorError>) {
        self.send(FlowCommand::ProcessorResult(result));
    }

    /// Ends the session immediately without waiting for any animation.
    pub fn teardown(&self) {
        self.send(FlowCommand::Teardown);
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    pub async fn subscribe_selection(&self) -> Option<SelectionSubscription> {
        let (tx, rx) = oneshot::channel();
        self.send(FlowCommand::SubscribeSelection(tx));
        rx.await.ok()
    }

    pub async fn subscribe_transitions(&self) -> Option<broadcast::Receiver<TransitionTarget>> {
        let (tx, rx) = oneshot::channel();
        self.send(FlowCommand::SubscribeTransitions(tx));
        rx.await.ok()
    }

    /// Returns `None` once the session has ended.
    pub async fn snapshot(&self) -> Option<FlowSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(FlowCommand::Snapshot(tx));
        rx.await.ok()
    }

    /// Waits until no confirmation is in flight.
    pub async fn settled(&self) {
        let (tx, rx) = oneshot::channel();
        self.send(FlowCommand::WhenSettled(tx));
        let _ = rx.await;
    }

    pub fn is_ended(&self) -> bool {
        *self.ended.borrow()
    }

    /// Waits for the session to end.
    pub async fn closed(&self) {
        let mut ended = self.ended.clone();
        // An error means the actor is gone, which only happens after it ended.
        let _ = ended.wait_for(|ended| *ended).await;
    }
}
