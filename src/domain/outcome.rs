use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Succeeded,
    Processing,
    RequiresCapture,
}

/// What the processor reports back for a confirmed payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntentResult {
    pub intent_id: String,
    pub status: IntentStatus,
}

/// Failures reported by a processor client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    /// The processor rejected the payment method; carries the decline code.
    #[error("{0}")]
    Declined(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("processor API error: {0}")]
    Api(String),
}

/// Why a confirmation attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmationError {
    #[error("missing flow args: a client secret is required to confirm")]
    Configuration,
    #[error("confirm requested without a payment selection")]
    NoSelection,
    #[error("external wallet confirmation is not supported")]
    ExternalWalletUnsupported,
    #[error("{reason}")]
    Processor { reason: String },
}

impl ConfirmationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfirmationError::Configuration => ErrorKind::Configuration,
            ConfirmationError::NoSelection => ErrorKind::NoSelection,
            ConfirmationError::ExternalWalletUnsupported => ErrorKind::UnsupportedWallet,
            ConfirmationError::Processor { .. } => ErrorKind::Confirmation,
        }
    }
}

/// Exactly one of these is produced per confirmation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Success,
    Failure(ConfirmationError),
}

impl From<std::result::Result<PaymentIntentResult, ProcessorError>> for ConfirmationOutcome {
    fn from(result: std::result::Result<PaymentIntentResult, ProcessorError>) -> Self {
        match result {
            Ok(_) => ConfirmationOutcome::Success,
            Err(e) => ConfirmationOutcome::Failure(ConfirmationError::Processor {
                reason: e.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    NoSelection,
    UnsupportedWallet,
    Confirmation,
}

/// Payload for the error display collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotification {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ConfirmationError> for ErrorNotification {
    fn from(error: &ConfirmationError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
