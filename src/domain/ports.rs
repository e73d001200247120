use super::outcome::{PaymentIntentResult, ProcessorError};
use super::presentation::PresentationState;
use super::selection::PaymentMethodCreateParams;
use super::session::{SavedSession, SessionId};
use super::transition::{ScreenId, ScreenTransition};
use crate::error::Result;
use async_trait::async_trait;

/// Confirms payment intents against a remote processor.
#[async_trait]
pub trait ProcessorClient: Send + Sync {
    async fn confirm_with_existing_method(
        &self,
        payment_method_id: &str,
        client_secret: &str,
    ) -> std::result::Result<PaymentIntentResult, ProcessorError>;

    async fn confirm_with_new_method(
        &self,
        create_params: &PaymentMethodCreateParams,
        client_secret: &str,
    ) -> std::result::Result<PaymentIntentResult, ProcessorError>;
}

/// Renders the sheet. Completion of animations is reported back through
/// `FlowHandle::presentation_reached`.
pub trait PresentationLayer: Send + Sync {
    fn show_screen(&self, screen: ScreenId, transition: Option<ScreenTransition>);
    fn set_presentation(&self, state: PresentationState);
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, id: &SessionId, session: &SavedSession) -> Result<()>;
    async fn load(&self, id: &SessionId) -> Result<Option<SavedSession>>;
    async fn remove(&self, id: &SessionId) -> Result<()>;
}

pub type ProcessorClientBox = Box<dyn ProcessorClient>;
pub type PresentationLayerBox = Box<dyn PresentationLayer>;
pub type SessionStoreBox = Box<dyn SessionStore>;
