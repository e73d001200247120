use crate::domain::args::FlowArgs;
use crate::domain::outcome::{ConfirmationError, ConfirmationOutcome};
use crate::domain::ports::ProcessorClientBox;
use crate::domain::selection::PaymentSelection;
use tracing::{debug, warn};

/// Turns a payment selection into exactly one processor confirmation call.
///
/// Processor failures never escape: they come back as
/// [`ConfirmationOutcome::Failure`].
pub struct ConfirmationDispatcher {
    client: ProcessorClientBox,
}

impl ConfirmationDispatcher {
    pub fn new(client: ProcessorClientBox) -> Self {
        Self { client }
    }

    /// Confirms the payment intent identified by `args.client_secret`.
    ///
    /// No retry is attempted and the selection is never modified.
    pub async fn confirm(
        &self,
        selection: Option<&PaymentSelection>,
        args: &FlowArgs,
    ) -> ConfirmationOutcome {
        let result = match selection {
            None => {
                warn!("confirmation dispatched without a payment selection");
                return ConfirmationOutcome::Failure(ConfirmationError::NoSelection);
            }
            Some(PaymentSelection::Saved { payment_method_id }) => {
                debug!(%payment_method_id, "confirming with saved payment method");
                self.client
                    .confirm_with_existing_method(payment_method_id, &args.client_secret)
                    .await
            }
            Some(PaymentSelection::New { create_params }) => {
                debug!("confirming with new payment method");
                self.client
                    .confirm_with_new_method(create_params, &args.client_secret)
                    .await
            }
            Some(PaymentSelection::ExternalWallet) => {
                warn!("external wallet selections are not confirmed by the card dispatcher");
                return ConfirmationOutcome::Failure(
                    ConfirmationError::ExternalWalletUnsupported,
                );
            }
        };

        if let Err(e) = &result {
            warn!(error = %e, "processor rejected confirmation");
        }
        ConfirmationOutcome::from(result)
    }
}
