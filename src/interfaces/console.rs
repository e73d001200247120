use crate::domain::ports::PresentationLayer;
use crate::domain::presentation::PresentationState;
use crate::domain::transition::{ScreenId, ScreenTransition};
use tokio::sync::mpsc;

/// A command the flow sent to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationCall {
    ShowScreen(ScreenId, Option<ScreenTransition>),
    SetPresentation(PresentationState),
}

/// Presentation layer for headless hosts: forwards every call to a channel so
/// the host loop can render it, or acknowledge it as an animation would.
pub struct ChannelPresentation {
    calls: mpsc::UnboundedSender<PresentationCall>,
}

impl ChannelPresentation {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PresentationCall>) {
        let (calls, rx) = mpsc::unbounded_channel();
        (Self { calls }, rx)
    }
}

impl PresentationLayer for ChannelPresentation {
    fn show_screen(&self, screen: ScreenId, transition: Option<ScreenTransition>) {
        let _ = self.calls.send(PresentationCall::ShowScreen(screen, transition));
    }

    fn set_presentation(&self, state: PresentationState) {
        let _ = self.calls.send(PresentationCall::SetPresentation(state));
    }
}
