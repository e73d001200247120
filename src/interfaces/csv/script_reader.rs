use crate::application::handle::FlowHandle;
use crate::domain::outcome::{IntentStatus, PaymentIntentResult, ProcessorError};
use crate::domain::presentation::PresentationState;
use crate::domain::selection::{PaymentMethodCreateParams, PaymentSelection};
use crate::domain::transition::TransitionTarget;
use crate::error::{FlowError, Result};
use serde::Deserialize;
use std::io::Read;

/// One user or host action in a scripted session.
#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    SelectSaved,
    SelectNew,
    SelectWallet,
    ClearSelection,
    Transition,
    Back,
    Confirm,
    TapOutside,
    Close,
    Reached,
    ProcessorResult,
    Teardown,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ScriptStep {
    pub action: ScriptAction,
    pub value: Option<String>,
}

impl ScriptStep {
    fn required_value(&self) -> Result<&str> {
        self.value.as_deref().ok_or_else(|| {
            FlowError::ValidationError(format!("{:?} requires a value", self.action))
        })
    }

    /// Sends the command this step stands for to the running session.
    pub fn apply(&self, handle: &FlowHandle) -> Result<()> {
        match self.action {
            ScriptAction::SelectSaved => {
                handle.set_selection(Some(PaymentSelection::saved(self.required_value()?)))
            }
            ScriptAction::SelectNew => {
                let params = parse_create_params(self.required_value()?)?;
                handle.set_selection(Some(PaymentSelection::new_method(params)));
            }
            ScriptAction::SelectWallet => {
                handle.set_selection(Some(PaymentSelection::ExternalWallet))
            }
            ScriptAction::ClearSelection => handle.set_selection(None),
            ScriptAction::Transition => {
                let target = match self.required_value()? {
                    "add_card" => TransitionTarget::AddCard,
                    other => {
                        return Err(FlowError::ValidationError(format!(
                            "Unknown transition target: {}",
                            other
                        )));
                    }
                };
                handle.request_transition(target);
            }
            ScriptAction::Back => handle.request_back(),
            ScriptAction::Confirm => handle.request_confirm(),
            ScriptAction::TapOutside => handle.user_dismiss_tapped(),
            ScriptAction::Close => handle.request_dismiss(),
            ScriptAction::Reached => {
                let state = match self.required_value()? {
                    "hidden" => PresentationState::Hidden,
                    "visible" => PresentationState::Visible,
                    other => {
                        return Err(FlowError::ValidationError(format!(
                            "Unknown presentation state: {}",
                            other
                        )));
                    }
                };
                handle.presentation_reached(state);
            }
            ScriptAction::ProcessorResult => {
                let result = match self.required_value()? {
                    "succeeded" => Ok(PaymentIntentResult {
                        intent_id: "pi_external".to_string(),
                        status: IntentStatus::Succeeded,
                    }),
                    reason => Err(ProcessorError::Declined(reason.to_string())),
                };
                handle.deliver_processor_result(result);
            }
            ScriptAction::Teardown => handle.teardown(),
        }
        Ok(())
    }
}

/// JSON objects are taken verbatim, anything else is treated as a card token.
fn parse_create_params(value: &str) -> Result<PaymentMethodCreateParams> {
    if value.trim_start().starts_with('{') {
        Ok(PaymentMethodCreateParams::new(serde_json::from_str(value)?))
    } else {
        Ok(PaymentMethodCreateParams::card(value))
    }
}

/// Reads scripted session steps from a CSV source.
///
/// Expects an `action,value` header. Whitespace is trimmed and the value column
/// may be left out.
pub struct ScriptReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScriptReader<R> {
    /// Creates a new `ScriptReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes steps.
    pub fn steps(self) -> impl Iterator<Item = Result<ScriptStep>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(FlowError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "action, value\nselect_saved, pm_1\nconfirm,\nback";
        let reader = ScriptReader::new(data.as_bytes());
        let results: Vec<Result<ScriptStep>> = reader.steps().collect();

        assert_eq!(results.len(), 3);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.action, ScriptAction::SelectSaved);
        assert_eq!(first.value.as_deref(), Some("pm_1"));
        assert_eq!(results[1].as_ref().unwrap().value, None);
        assert_eq!(results[2].as_ref().unwrap().action, ScriptAction::Back);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "action, value\njump, 1";
        let reader = ScriptReader::new(data.as_bytes());
        let results: Vec<Result<ScriptStep>> = reader.steps().collect();

        assert!(results[0].is_err());
    }

    #[test]
    fn test_create_params_parsing() {
        let params = parse_create_params(r#"{"type": "card", "card": {"number": "4242"}}"#).unwrap();
        assert_eq!(params.as_json()["card"]["number"], "4242");

        let token = parse_create_params("tok_visa").unwrap();
        assert_eq!(token, PaymentMethodCreateParams::card("tok_visa"));

        assert!(parse_create_params("{not json").is_err());
    }
}
