use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};

const SECRET_SEPARATOR: &str = "_secret_";

/// Immutable input of a flow session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowArgs {
    pub client_secret: String,
}

impl FlowArgs {
    pub fn new(client_secret: impl Into<String>) -> Result<Self> {
        let client_secret = client_secret.into();
        if client_secret.trim().is_empty() {
            return Err(FlowError::ValidationError(
                "Client secret must not be blank".to_string(),
            ));
        }
        Ok(Self { client_secret })
    }

    pub fn payment_intent_id(&self) -> Option<&str> {
        payment_intent_id(&self.client_secret)
    }
}

/// The payment intent id embedded in a `pi_..._secret_...` client secret.
pub fn payment_intent_id(client_secret: &str) -> Option<&str> {
    client_secret
        .split_once(SECRET_SEPARATOR)
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
}
