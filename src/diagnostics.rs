//! generation diagnostics
//!
//! skipped operations and name collisions are reported as data, and echoed
//! as `tracing` events so the binary's log filter shows them too.

use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// one note about a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub operation: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.operation, self.message)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn info(&mut self, operation: &str, message: impl Into<String>) {
        let message = message.into();
        info!(operation, "{message}");
        self.push(Severity::Info, operation, message);
    }

    pub(crate) fn warn(&mut self, operation: &str, message: impl Into<String>) {
        let message = message.into();
        warn!(operation, "{message}");
        self.push(Severity::Warning, operation, message);
    }

    fn push(&mut self, severity: Severity, operation: &str, message: String) {
        self.items.push(Diagnostic {
            severity,
            operation: operation.to_string(),
            message,
        });
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_in_order() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.info("users", "empty selection");
        diagnostics.warn("createUser", "no input");
        let items = diagnostics.into_vec();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].severity, Severity::Info);
        assert_eq!(items[1].to_string(), "warning: createUser: no input");
    }
}
