//! Panel activation seam.
//!
//! The controller never owns the panel it shows and hides; it holds a
//! non-owning reference through this trait and tolerates having none at
//! all (every activation step degrades to a no-op).

use std::sync::Mutex;

/// Activation surface of the UI element being shown or hidden.
pub trait Panel: Send + Sync {
    /// Whether the panel is currently active.
    fn is_active(&self) -> bool;

    /// Activate or deactivate the panel.
    fn set_active(&self, active: bool);
}

struct MemoryPanelState {
    active: bool,
    history: Vec<bool>,
}

/// In-memory panel for testing. Records every `set_active` call,
/// including redundant ones.
pub struct MemoryPanel {
    state: Mutex<MemoryPanelState>,
}

impl Default for MemoryPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPanel {
    /// Create an inactive panel.
    #[must_use]
    pub fn new() -> Self {
        Self::with_active(false)
    }

    /// Create a panel in the given activation state.
    #[must_use]
    pub fn with_active(active: bool) -> Self {
        Self {
            state: Mutex::new(MemoryPanelState {
                active,
                history: Vec::new(),
            }),
        }
    }

    /// Every `set_active` argument, in call order.
    #[must_use]
    pub fn history(&self) -> Vec<bool> {
        self.state
            .lock()
            .expect("MemoryPanel mutex poisoned")
            .history
            .clone()
    }

    /// Number of `set_active` calls so far.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.state
            .lock()
            .expect("MemoryPanel mutex poisoned")
            .history
            .len()
    }
}

impl Panel for MemoryPanel {
    fn is_active(&self) -> bool {
        self.state.lock().expect("MemoryPanel mutex poisoned").active
    }

    fn set_active(&self, active: bool) {
        let mut state = self.state.lock().expect("MemoryPanel mutex poisoned");
        state.active = active;
        state.history.push(active);
    }
}
