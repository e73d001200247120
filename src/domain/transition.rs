use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Screens the presentation layer can render inside the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenId {
    MethodsList,
    AddCard,
}

/// Destinations reachable from the methods list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTarget {
    AddCard,
}

impl TransitionTarget {
    pub fn screen(&self) -> ScreenId {
        match self {
            TransitionTarget::AddCard => ScreenId::AddCard,
        }
    }

    pub fn animations(&self) -> TransitionAnimations {
        match self {
            TransitionTarget::AddCard => TransitionAnimations {
                enter: Animation::EnterFromRight,
                exit: Animation::ExitToLeft,
                pop_enter: Animation::EnterFromLeft,
                pop_exit: Animation::ExitToRight,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    EnterFromRight,
    ExitToLeft,
    EnterFromLeft,
    ExitToRight,
}

/// Animations attached to a target. `enter`/`exit` apply when the target is
/// pushed, `pop_enter`/`pop_exit` when it is popped again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionAnimations {
    pub enter: Animation,
    pub exit: Animation,
    pub pop_enter: Animation,
    pub pop_exit: Animation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    Forward,
    Back,
}

/// How the presentation layer should swap to a new screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenTransition {
    pub animations: TransitionAnimations,
    pub direction: NavigationDirection,
}

/// One-shot navigation events. Observers attached after an emission miss it.
#[derive(Debug, Clone)]
pub struct TransitionSignal {
    sender: broadcast::Sender<TransitionTarget>,
}

impl TransitionSignal {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Emits `target` and returns how many observers received it.
    pub fn request_transition(&self, target: TransitionTarget) -> usize {
        self.sender.send(target).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransitionTarget> {
        self.sender.subscribe()
    }
}

impl Default for TransitionSignal {
    fn default() -> Self {
        Self::new(16)
    }
}
