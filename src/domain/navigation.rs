use super::transition::{ScreenId, TransitionTarget};

/// Screens pushed on top of the methods list, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationStack {
    entries: Vec<TransitionTarget>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<TransitionTarget>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, target: TransitionTarget) {
        self.entries.push(target);
    }

    pub fn pop(&mut self) -> Option<TransitionTarget> {
        self.entries.pop()
    }

    pub fn top(&self) -> Option<TransitionTarget> {
        self.entries.last().copied()
    }

    /// The screen that should be on display: the top entry, or the methods list.
    pub fn active_screen(&self) -> ScreenId {
        self.top()
            .map(|target| target.screen())
            .unwrap_or(ScreenId::MethodsList)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[TransitionTarget] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stack_shows_methods_list() {
        let stack = NavigationStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.active_screen(), ScreenId::MethodsList);
    }

    #[test]
    fn test_active_screen_tracks_top() {
        let mut stack = NavigationStack::new();
        stack.push(TransitionTarget::AddCard);
        stack.push(TransitionTarget::AddCard);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.active_screen(), ScreenId::AddCard);

        assert_eq!(stack.pop(), Some(TransitionTarget::AddCard));
        assert_eq!(stack.active_screen(), ScreenId::AddCard);
        assert_eq!(stack.pop(), Some(TransitionTarget::AddCard));
        assert_eq!(stack.active_screen(), ScreenId::MethodsList);
        assert_eq!(stack.pop(), None);
    }
}
