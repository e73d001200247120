use super::args::FlowArgs;
use super::selection::PaymentSelection;
use super::transition::TransitionTarget;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a flow session across host recreation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State that survives the host tearing down and recreating a session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SavedSession {
    pub args: Option<FlowArgs>,
    pub selection: Option<PaymentSelection>,
    #[serde(default)]
    pub back_stack: Vec<TransitionTarget>,
}
