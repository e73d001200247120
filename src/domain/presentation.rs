use serde::{Deserialize, Serialize};

/// Whether the sheet is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationState {
    Hidden,
    Visible,
}

/// Lifecycle of one flow session.
///
/// `Starting` waits out the initial presentation delay, `Closing` waits for the
/// presentation layer to report that the sheet reached `Hidden`. `Ended` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Starting,
    Visible,
    Closing,
    Ended,
}

impl SessionPhase {
    pub fn presentation(&self) -> PresentationState {
        match self {
            SessionPhase::Starting | SessionPhase::Ended => PresentationState::Hidden,
            SessionPhase::Visible | SessionPhase::Closing => PresentationState::Visible,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissReason {
    TapOutside,
    Explicit,
    BackNavigation,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The sheet animated out and reached `Hidden`.
    Dismissed,
    /// The host destroyed the session.
    TornDown,
}
