// crates/fieldtree/src/mutation.rs
//! Applies one enable/disable request to the engine.
//!
//! Each request moves through `Presented -> Pending -> {Applied, RolledBack}`.
//! The entry shows the user's choice while the request is pending; if the
//! engine refuses the new fragment, the entry reverts to its previous value
//! and the engine's message is returned unchanged. No retry and no
//! compensating write is attempted.

use crate::checklist::ChecklistEntry;
use crate::engine::TreeNode;
use crate::error::SessionError;
use crate::fragment;
use crate::log::{LogContext, my_debug, my_error, my_info, my_warn};

const CTX: LogContext = LogContext::new("mutation", "toggle");

/// Lifecycle of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    /// The entry shows the state last confirmed by the engine.
    Presented,
    /// The entry shows the user's choice; the engine has not answered yet.
    Pending,
    /// The engine accepted the new fragment.
    Applied,
    /// The engine refused; the entry shows its pre-toggle value again.
    RolledBack,
}

/// Result of an accepted toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub state: ToggleState,
    pub label: String,
    pub enabled: bool,
    /// `false` if the fragment carried no disabled marker. The unchanged
    /// fragment is still pushed, so the node's real state did not change.
    pub marker_found: bool,
}

/// Drives a single toggle request for one entry.
pub struct Toggle<'a, N> {
    entry: &'a mut ChecklistEntry<N>,
    previous: bool,
    state: ToggleState,
}

impl<'a, N: TreeNode> Toggle<'a, N> {
    pub fn new(entry: &'a mut ChecklistEntry<N>) -> Self {
        let previous = entry.checked;
        Self {
            entry,
            previous,
            state: ToggleState::Presented,
        }
    }

    /// Runs the request to completion.
    pub fn apply(mut self, desired_enabled: bool) -> Result<ToggleOutcome, SessionError> {
        let desired_disabled = !desired_enabled;
        let label = self.entry.label.clone();
        my_info!(
            CTX,
            "Setting device '{}' to {}",
            label,
            if desired_disabled { "DISABLED" } else { "ENABLED" }
        );

        // 1. Show the user's choice while the engine works.
        self.entry.checked = desired_enabled;
        self.state = ToggleState::Pending;

        // 2. Fetch the current fragment.
        let current = match self.entry.node.handle.produce_fragment(false) {
            Ok(xml) => xml,
            Err(e) => {
                self.roll_back();
                my_error!(CTX, "Cannot read configuration of '{}': {}", label, e);
                return Err(SessionError::NodeUnreadable {
                    path: self.entry.node.path(),
                    reason: e.message,
                });
            }
        };

        // 3. Rewrite the flag.
        let marker_found = fragment::locate(&current).is_some();
        if !marker_found {
            my_warn!(CTX, "'{}' has no Disabled marker; pushing fragment unchanged", label);
        }
        let modified = fragment::write(&current, desired_disabled);
        my_debug!(CTX, "Pushing fragment for '{}': {}", label, modified);

        // 4. Push to the engine.
        match self.entry.node.handle.consume_fragment(&modified) {
            Ok(()) => {
                self.state = ToggleState::Applied;
                my_info!(CTX, "Device state of '{}' updated successfully", label);
                Ok(ToggleOutcome {
                    state: self.state,
                    label,
                    enabled: desired_enabled,
                    marker_found,
                })
            }
            Err(e) => {
                self.roll_back();
                my_error!(CTX, "Engine rejected state change of '{}': {}", label, e);
                Err(SessionError::MutationRejected {
                    label,
                    reason: e.message,
                })
            }
        }
    }

    fn roll_back(&mut self) {
        self.entry.checked = self.previous;
        self.state = ToggleState::RolledBack;
    }
}

/// Toggles `entry` to `desired_enabled`.
pub fn toggle<N: TreeNode>(
    entry: &mut ChecklistEntry<N>,
    desired_enabled: bool,
) -> Result<ToggleOutcome, SessionError> {
    Toggle::new(entry).apply(desired_enabled)
}
