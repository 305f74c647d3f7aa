//! Confirmation gate interposed before destructive actions.
//!
//! # Design
//! - Two states only: `Closed` or `Open { message, action }`.
//! - A new request replaces the open one; nothing is queued.
//! - `confirm` moves the deferred action out, so it can fire at most once.

use std::mem;

/// State of the confirmation prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmState<A> {
    /// No prompt is shown.
    Closed,
    /// Prompt is shown and holds the deferred action.
    Open {
        /// Prompt text.
        message: String,
        /// Action fired on confirmation.
        action: A,
    },
}

/// Page-owned confirmation prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationGate<A> {
    state: ConfirmState<A>,
}

impl<A> Default for ConfirmationGate<A> {
    fn default() -> Self {
        Self {
            state: ConfirmState::Closed,
        }
    }
}

impl<A> ConfirmationGate<A> {
    /// Closed gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the prompt; returns the action of a request that was replaced.
    pub fn request(&mut self, message: impl Into<String>, action: A) -> Option<A> {
        let previous = mem::replace(
            &mut self.state,
            ConfirmState::Open {
                message: message.into(),
                action,
            },
        );
        match previous {
            ConfirmState::Open { action, .. } => Some(action),
            ConfirmState::Closed => None,
        }
    }

    /// Hand out the deferred action and close the prompt.
    ///
    /// Returns `None` when the gate is already closed.
    pub fn confirm(&mut self) -> Option<A> {
        match mem::replace(&mut self.state, ConfirmState::Closed) {
            ConfirmState::Open { action, .. } => Some(action),
            ConfirmState::Closed => None,
        }
    }

    /// Close without firing; returns whether a prompt was open.
    pub fn cancel(&mut self) -> bool {
        matches!(
            mem::replace(&mut self.state, ConfirmState::Closed),
            ConfirmState::Open { .. }
        )
    }

    /// Whether a prompt is shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, ConfirmState::Open { .. })
    }

    /// Prompt text while open.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match &self.state {
            ConfirmState::Open { message, .. } => Some(message),
            ConfirmState::Closed => None,
        }
    }

    /// Deferred action while open.
    #[must_use]
    pub const fn pending(&self) -> Option<&A> {
        match &self.state {
            ConfirmState::Open { action, .. } => Some(action),
            ConfirmState::Closed => None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ConfirmState<A> {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_fires_exactly_once() {
        let mut gate = ConfirmationGate::new();
        gate.request("delete 2 rows?", 2_u32);
        assert_eq!(gate.confirm(), Some(2));
        assert!(!gate.is_open());
        assert_eq!(gate.confirm(), None);
    }

    #[test]
    fn cancel_drops_the_action() {
        let mut gate = ConfirmationGate::new();
        gate.request("sure?", "drop");
        assert!(gate.cancel());
        assert!(!gate.cancel());
        assert_eq!(gate.confirm(), None);
    }

    #[test]
    fn new_request_replaces_open_one() {
        let mut gate = ConfirmationGate::new();
        assert_eq!(gate.request("first", 1), None);
        assert_eq!(gate.request("second", 2), Some(1));
        assert_eq!(gate.message(), Some("second"));
        assert_eq!(gate.pending(), Some(&2));
        assert_eq!(gate.confirm(), Some(2));
    }
}
