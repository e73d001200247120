use super::dispatcher::ConfirmationDispatcher;
use super::handle::{FlowCommand, FlowEvent, FlowHandle, FlowSnapshot};
use crate::config::FlowSettings;
use crate::domain::args::FlowArgs;
use crate::domain::navigation::NavigationStack;
use crate::domain::outcome::{ConfirmationError, ConfirmationOutcome, ErrorNotification};
use crate::domain::ports::{PresentationLayerBox, ProcessorClientBox, SessionStoreBox};
use crate::domain::presentation::{DismissReason, EndReason, PresentationState, SessionPhase};
use crate::domain::selection::{PaymentSelection, SelectionStore};
use crate::domain::session::{SavedSession, SessionId};
use crate::domain::transition::{
    NavigationDirection, ScreenId, ScreenTransition, TransitionSignal, TransitionTarget,
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Orchestrates one checkout sheet session.
///
/// Built with its collaborators, then [`start`](Self::start)ed onto a tokio
/// task that owns all session state. Every command, confirmation result and
/// timer tick is processed in order on that task.
pub struct FlowController {
    handle: FlowHandle,
    actor: FlowActor,
}

impl FlowController {
    /// Creates a controller for a new session.
    ///
    /// # Arguments
    ///
    /// * `processor` - Client used to confirm payment intents.
    /// * `presentation` - Layer rendering the sheet and its screens.
    /// * `settings` - Presentation delay and channel sizing.
    pub fn new(
        processor: ProcessorClientBox,
        presentation: PresentationLayerBox,
        settings: FlowSettings,
    ) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(settings.event_buffer.max(1));
        let (ended_tx, ended_rx) = watch::channel(false);

        let actor = FlowActor {
            session_id: SessionId::new("ephemeral"),
            phase: SessionPhase::Starting,
            args: None,
            selection: SelectionStore::new(settings.event_buffer),
            navigation: NavigationStack::new(),
            transitions: TransitionSignal::new(settings.event_buffer),
            dispatcher: Arc::new(ConfirmationDispatcher::new(processor)),
            presentation,
            store: None,
            settings,
            events: events.clone(),
            ended: ended_tx,
            inbox,
            weak_commands: commands.downgrade(),
            delay_task: None,
            requested_presentation: PresentationState::Hidden,
            visible_acknowledged: false,
            confirmation_pending: false,
            settled_waiters: Vec::new(),
        };

        Self {
            handle: FlowHandle::new(commands, events, ended_rx),
            actor,
        }
    }

    /// Supplies the client secret to confirm against. Without it, a saved
    /// session may still provide one, otherwise confirming reports a
    /// configuration error.
    pub fn with_args(mut self, args: FlowArgs) -> Self {
        self.actor.args = Some(args);
        self
    }

    /// Persists args, selection and back stack under `session_id` so a
    /// recreated session picks up where this one stopped.
    pub fn with_session_store(mut self, session_id: SessionId, store: SessionStoreBox) -> Self {
        self.actor.session_id = session_id;
        self.actor.store = Some(store);
        self
    }

    /// Subscribes before the session starts, so no event is missed.
    pub fn subscribe_events(&self) -> broadcast::Receiver<FlowEvent> {
        self.handle.subscribe_events()
    }

    /// Spawns the session onto the current tokio runtime.
    pub fn start(self) -> FlowHandle {
        tokio::spawn(self.actor.run());
        self.handle
    }
}

struct FlowActor {
    session_id: SessionId,
    phase: SessionPhase,
    args: Option<FlowArgs>,
    selection: SelectionStore,
    navigation: NavigationStack,
    transitions: TransitionSignal,
    dispatcher: Arc<ConfirmationDispatcher>,
    presentation: PresentationLayerBox,
    store: Option<SessionStoreBox>,
    settings: FlowSettings,
    events: broadcast::Sender<FlowEvent>,
    ended: watch::Sender<bool>,
    inbox: mpsc::UnboundedReceiver<FlowCommand>,
    weak_commands: mpsc::WeakUnboundedSender<FlowCommand>,
    delay_task: Option<JoinHandle<()>>,
    /// Last state handed to the presentation layer; acks for anything else are stale.
    requested_presentation: PresentationState,
    visible_acknowledged: bool,
    confirmation_pending: bool,
    settled_waiters: Vec<oneshot::Sender<()>>,
}

impl FlowActor {
    async fn run(mut self) {
        self.set_presentation(PresentationState::Hidden);
        if self.store.is_some() {
            self.restore().await;
            self.persist().await;
        }
        self.schedule_presentation();

        while let Some(command) = self.inbox.recv().await {
            self.handle(command).await;
            if self.phase == SessionPhase::Ended {
                return;
            }
        }

        // Every handle was dropped.
        self.finish(EndReason::TornDown).await;
    }

    async fn handle(&mut self, command: FlowCommand) {
        match command {
            FlowCommand::SetSelection(selection) => {
                debug!(
                    session = %self.session_id,
                    selection = selection.as_ref().map(PaymentSelection::kind),
                    "selection changed"
                );
                self.selection.set_selection(selection);
                self.persist().await;
            }
            FlowCommand::RequestTransition(target) => self.navigate_forward(target).await,
            FlowCommand::RequestBack => self.navigate_back().await,
            FlowCommand::RequestConfirm => self.request_confirm(),
            FlowCommand::Dismiss(reason) => self.dismiss(reason).await,
            FlowCommand::PresentationReached(state) => self.on_presentation_reached(state).await,
            FlowCommand::PresentationDelayElapsed => self.present(),
            FlowCommand::ConfirmationResolved(outcome) => {
                self.resolve(outcome).await;
                self.confirmation_pending = false;
                self.notify_settled();
            }
            FlowCommand::ProcessorResult(result) => {
                self.resolve(ConfirmationOutcome::from(result)).await;
            }
            FlowCommand::Teardown => self.finish(EndReason::TornDown).await,
            FlowCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            FlowCommand::SubscribeSelection(reply) => {
                let _ = reply.send(self.selection.subscribe());
            }
            FlowCommand::SubscribeTransitions(reply) => {
                let _ = reply.send(self.transitions.subscribe());
            }
            FlowCommand::WhenSettled(reply) => {
                if self.confirmation_pending {
                    self.settled_waiters.push(reply);
                } else {
                    let _ = reply.send(());
                }
            }
        }
    }

    fn schedule_presentation(&mut self) {
        let commands = self.weak_commands.clone();
        let delay = self.settings.presentation_delay();
        self.delay_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(FlowCommand::PresentationDelayElapsed);
            }
        }));
    }

    fn present(&mut self) {
        if self.phase != SessionPhase::Starting {
            return;
        }
        self.delay_task = None;
        self.phase = SessionPhase::Visible;
        info!(session = %self.session_id, "presenting payment sheet");
        self.set_presentation(PresentationState::Visible);
        self.show_screen(self.navigation.active_screen(), None);
    }

    async fn navigate_forward(&mut self, target: TransitionTarget) {
        if self.phase == SessionPhase::Closing {
            debug!(session = %self.session_id, ?target, "ignoring transition while closing");
            return;
        }
        self.transitions.request_transition(target);
        self.navigation.push(target);
        self.show_screen(
            target.screen(),
            Some(ScreenTransition {
                animations: target.animations(),
                direction: NavigationDirection::Forward,
            }),
        );
        self.persist().await;
    }

    async fn navigate_back(&mut self) {
        if self.phase == SessionPhase::Closing {
            debug!(session = %self.session_id, "ignoring back navigation while closing");
            return;
        }
        match self.navigation.pop() {
            Some(popped) => {
                self.show_screen(
                    self.navigation.active_screen(),
                    Some(ScreenTransition {
                        animations: popped.animations(),
                        direction: NavigationDirection::Back,
                    }),
                );
                self.persist().await;
            }
            None => self.dismiss(DismissReason::BackNavigation).await,
        }
    }

    fn request_confirm(&mut self) {
        if self.phase != SessionPhase::Visible {
            debug!(session = %self.session_id, phase = ?self.phase, "ignoring confirm request");
            return;
        }
        if self.confirmation_pending {
            warn!(session = %self.session_id, "confirmation already in flight; ignoring request");
            return;
        }
        let Some(args) = self.args.clone() else {
            self.report(&ConfirmationError::Configuration);
            return;
        };

        let selection = self.selection.selection().cloned();
        if selection == Some(PaymentSelection::ExternalWallet) {
            self.confirm_external_wallet();
            return;
        }

        self.confirmation_pending = true;
        self.emit(FlowEvent::ConfirmationStarted);
        info!(
            session = %self.session_id,
            selection = selection.as_ref().map(PaymentSelection::kind),
            "dispatching confirmation"
        );

        let dispatcher = Arc::clone(&self.dispatcher);
        let commands = self.weak_commands.clone();
        tokio::spawn(async move {
            let outcome = dispatcher.confirm(selection.as_ref(), &args).await;
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(FlowCommand::ConfirmationResolved(outcome));
            }
        });
    }

    /// Wallet selections are confirmed by the host's wallet sheet, which this
    /// flow has no client for, so the request is reported as unsupported and
    /// the sheet stays open.
    fn confirm_external_wallet(&mut self) {
        warn!(session = %self.session_id, "external wallet confirmation requested");
        self.report(&ConfirmationError::ExternalWalletUnsupported);
    }

    async fn resolve(&mut self, outcome: ConfirmationOutcome) {
        match outcome {
            ConfirmationOutcome::Success => {
                info!(session = %self.session_id, "payment confirmed");
                self.emit(FlowEvent::ConfirmationSucceeded);
                self.dismiss(DismissReason::Confirmed).await;
            }
            ConfirmationOutcome::Failure(error) => self.report(&error),
        }
    }

    async fn dismiss(&mut self, reason: DismissReason) {
        match self.phase {
            SessionPhase::Starting => {
                info!(session = %self.session_id, ?reason, "dismissed before presentation");
                self.finish(EndReason::Dismissed).await;
            }
            SessionPhase::Visible => {
                info!(session = %self.session_id, ?reason, "dismissing payment sheet");
                self.phase = SessionPhase::Closing;
                self.set_presentation(PresentationState::Hidden);
            }
            SessionPhase::Closing | SessionPhase::Ended => {
                debug!(session = %self.session_id, ?reason, "already closing");
            }
        }
    }

    async fn on_presentation_reached(&mut self, state: PresentationState) {
        let requested = self.requested_presentation;
        match (self.phase, state) {
            (SessionPhase::Visible, PresentationState::Visible) if requested == state => {
                self.visible_acknowledged = true;
            }
            (SessionPhase::Closing, PresentationState::Hidden) if requested == state => {
                self.finish(EndReason::Dismissed).await;
            }
            // Hidden without asking for it: the user swiped the sheet away.
            (SessionPhase::Visible, PresentationState::Hidden) if self.visible_acknowledged => {
                info!(session = %self.session_id, "sheet hidden by the user");
                self.finish(EndReason::Dismissed).await;
            }
            (phase, state) => {
                debug!(
                    session = %self.session_id,
                    ?phase,
                    ?state,
                    ?requested,
                    "ignoring presentation update"
                );
            }
        }
    }

    async fn finish(&mut self, reason: EndReason) {
        if self.phase == SessionPhase::Ended {
            return;
        }
        self.phase = SessionPhase::Ended;
        if let Some(task) = self.delay_task.take() {
            task.abort();
        }
        if reason == EndReason::Dismissed
            && let Some(store) = &self.store
            && let Err(e) = store.remove(&self.session_id).await
        {
            warn!(session = %self.session_id, error = %e, "failed to remove saved session");
        }

        info!(session = %self.session_id, ?reason, "session ended");
        self.emit(FlowEvent::Ended(reason));
        self.ended.send_replace(true);
        for waiter in self.settled_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }

    fn report(&self, error: &ConfirmationError) {
        warn!(session = %self.session_id, kind = ?error.kind(), %error, "flow error");
        self.emit(FlowEvent::Error(ErrorNotification::from(error)));
    }

    fn notify_settled(&mut self) {
        for waiter in self.settled_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }

    fn set_presentation(&mut self, state: PresentationState) {
        self.requested_presentation = state;
        self.presentation.set_presentation(state);
        self.emit(FlowEvent::PresentationRequested(state));
    }

    fn show_screen(&self, screen: ScreenId, transition: Option<ScreenTransition>) {
        debug!(session = %self.session_id, ?screen, "showing screen");
        self.presentation.show_screen(screen, transition);
        self.emit(FlowEvent::ScreenShown(screen));
    }

    fn emit(&self, event: FlowEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            phase: self.phase,
            presentation: self.phase.presentation(),
            active_screen: self.navigation.active_screen(),
            back_stack: self.navigation.entries().to_vec(),
            selection: self.selection.selection().cloned(),
            confirmation_pending: self.confirmation_pending,
        }
    }

    async fn restore(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        match store.load(&self.session_id).await {
            Ok(Some(saved)) => {
                info!(
                    session = %self.session_id,
                    depth = saved.back_stack.len(),
                    "restoring saved session"
                );
                if self.args.is_none() {
                    self.args = saved.args;
                }
                self.selection.set_selection(saved.selection);
                self.navigation = NavigationStack::from_entries(saved.back_stack);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(session = %self.session_id, error = %e, "failed to load saved session");
            }
        }
    }

    async fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let saved = SavedSession {
            args: self.args.clone(),
            selection: self.selection.selection().cloned(),
            back_stack: self.navigation.entries().to_vec(),
        };
        if let Err(e) = store.save(&self.session_id, &saved).await {
            warn!(session = %self.session_id, error = %e, "failed to save session");
        }
    }
}
