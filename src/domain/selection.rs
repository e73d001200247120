use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::broadcast;

/// Creation data for a payment method entered during this session.
///
/// The flow never inspects these parameters; they are handed to the processor
/// client as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethodCreateParams(Value);

impl PaymentMethodCreateParams {
    pub fn new(params: Value) -> Self {
        Self(params)
    }

    /// Card creation params backed by a tokenized card.
    pub fn card(token: impl Into<String>) -> Self {
        Self(json!({ "type": "card", "card": { "token": token.into() } }))
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

/// The payment method the user currently intends to pay with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentSelection {
    /// A payment method already stored for the customer.
    Saved { payment_method_id: String },
    /// A payment method entered this session and not stored yet.
    New {
        create_params: PaymentMethodCreateParams,
    },
    /// A third-party wallet, confirmed outside the card dispatch path.
    ExternalWallet,
}

impl PaymentSelection {
    pub fn saved(payment_method_id: impl Into<String>) -> Self {
        Self::Saved {
            payment_method_id: payment_method_id.into(),
        }
    }

    pub fn new_method(create_params: PaymentMethodCreateParams) -> Self {
        Self::New { create_params }
    }

    /// Short label used in logs and event output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Saved { .. } => "saved",
            Self::New { .. } => "new",
            Self::ExternalWallet => "external_wallet",
        }
    }
}

/// The value current at subscription time, followed by every later change.
///
/// `changes` is bounded by the flow's `event_buffer`. A receiver that falls
/// further behind gets `RecvError::Lagged` and should resynchronise from a
/// fresh subscription or a snapshot.
#[derive(Debug)]
pub struct SelectionSubscription {
    pub current: Option<PaymentSelection>,
    pub changes: broadcast::Receiver<Option<PaymentSelection>>,
}

/// Single source of truth for the active payment selection.
///
/// Accepts any value without validation; consumers check it at confirmation time.
#[derive(Debug)]
pub struct SelectionStore {
    current: Option<PaymentSelection>,
    changes: broadcast::Sender<Option<PaymentSelection>>,
}

impl SelectionStore {
    pub fn new(capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity.max(1));
        Self {
            current: None,
            changes,
        }
    }

    /// Replaces the current selection and notifies observers immediately.
    pub fn set_selection(&mut self, selection: Option<PaymentSelection>) {
        self.current = selection.clone();
        // No observers is fine.
        let _ = self.changes.send(selection);
    }

    pub fn selection(&self) -> Option<&PaymentSelection> {
        self.current.as_ref()
    }

    pub fn subscribe(&self) -> SelectionSubscription {
        SelectionSubscription {
            current: self.current.clone(),
            changes: self.changes.subscribe(),
        }
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_selection_is_none() {
        let store = SelectionStore::default();
        assert!(store.selection().is_none());
    }

    #[test]
    fn test_set_selection_replaces_value() {
        let mut store = SelectionStore::default();
        store.set_selection(Some(PaymentSelection::saved("pm_1")));
        store.set_selection(Some(PaymentSelection::ExternalWallet));
        assert_eq!(store.selection(), Some(&PaymentSelection::ExternalWallet));

        store.set_selection(None);
        assert!(store.selection().is_none());
    }

    #[test]
    fn test_subscriber_sees_current_then_changes_in_order() {
        let mut store = SelectionStore::default();
        store.set_selection(Some(PaymentSelection::saved("pm_1")));

        let mut sub = store.subscribe();
        assert_eq!(sub.current, Some(PaymentSelection::saved("pm_1")));

        store.set_selection(Some(PaymentSelection::saved("pm_2")));
        store.set_selection(None);

        assert_eq!(
            sub.changes.try_recv().unwrap(),
            Some(PaymentSelection::saved("pm_2"))
        );
        assert_eq!(sub.changes.try_recv().unwrap(), None);
        assert!(sub.changes.try_recv().is_err());
    }

    #[test]
    fn test_slow_subscriber_is_told_it_lagged() {
        let mut store = SelectionStore::new(2);
        let mut sub = store.subscribe();

        store.set_selection(Some(PaymentSelection::saved("pm_1")));
        store.set_selection(Some(PaymentSelection::saved("pm_2")));
        store.set_selection(Some(PaymentSelection::saved("pm_3")));

        assert!(matches!(
            sub.changes.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
        assert_eq!(
            sub.changes.try_recv().unwrap(),
            Some(PaymentSelection::saved("pm_2"))
        );
    }

    #[test]
    fn test_selection_serialization_is_tagged() {
        let json = serde_json::to_value(PaymentSelection::saved("pm_1")).unwrap();
        assert_eq!(json, json!({ "type": "saved", "payment_method_id": "pm_1" }));

        let wallet: PaymentSelection =
            serde_json::from_value(json!({ "type": "external_wallet" })).unwrap();
        assert_eq!(wallet, PaymentSelection::ExternalWallet);
    }
}
