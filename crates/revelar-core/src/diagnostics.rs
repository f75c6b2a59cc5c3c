//! Warning channel for non-fatal transition diagnostics.
//!
//! Transition failures degrade to no-ops rather than errors; the one thing
//! worth surfacing is a transition started under conditions where it
//! cannot visibly progress. Hosts install a sink; the default discards.

use std::sync::Mutex;

/// Sink for non-fatal warnings.
pub trait Diagnostics: Send + Sync {
    /// Record a warning message.
    fn warn(&self, message: &str);
}

/// Sink that discards all warnings. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn warn(&self, _message: &str) {}
}

/// In-memory sink for testing.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    messages: Mutex<Vec<String>>,
}

impl MemoryDiagnostics {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .expect("MemoryDiagnostics mutex poisoned")
            .clone()
    }

    /// Number of recorded messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .expect("MemoryDiagnostics mutex poisoned")
            .len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages
            .lock()
            .expect("MemoryDiagnostics mutex poisoned")
            .is_empty()
    }

    /// Drop all recorded messages.
    pub fn clear(&self) {
        self.messages
            .lock()
            .expect("MemoryDiagnostics mutex poisoned")
            .clear();
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .expect("MemoryDiagnostics mutex poisoned")
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_diagnostics_records_in_order() {
        let sink = MemoryDiagnostics::new();
        sink.warn("first");
        sink.warn("second");

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.messages(), vec!["first", "second"]);
    }

    #[test]
    fn test_memory_diagnostics_clear() {
        let sink = MemoryDiagnostics::new();
        sink.warn("message");
        assert!(!sink.is_empty());

        sink.clear();
        assert!(sink.is_empty());
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn test_null_diagnostics_discards() {
        let sink = NullDiagnostics;
        sink.warn("dropped");
    }
}
