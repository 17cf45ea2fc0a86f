//! User-visible notifications.
//!
//! The dispatcher reports outcomes through a [`Notifier`]. Delivery is
//! fire-and-forget: a notifier never reports back.

use std::cell::RefCell;
use std::fmt;

use serde::Serialize;
use tracing::debug;

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// An operation completed.
    Success,
    /// Something failed.
    Error,
    /// Neutral information.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Sink for user-visible messages.
pub trait Notifier {
    /// Deliver a message.
    fn notify(&self, message: &str, severity: Severity);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, message: &str, severity: Severity) {
        (**self).notify(message, severity);
    }
}

/// Writes notifications to standard error. The matching tracing event is
/// debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        debug!(%severity, "{message}");
        let marker = match severity {
            Severity::Success => "✓",
            Severity::Error => "✗",
            Severity::Info => "·",
        };
        eprintln!("{marker} {message}");
    }
}

/// A delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// The message text.
    pub message: String,
    /// Its severity.
    pub severity: Severity,
}

/// Keeps every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.received.borrow().clone()
    }

    /// Messages received with the given severity.
    #[must_use]
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.received
            .borrow()
            .iter()
            .filter(|n| n.severity == severity)
            .map(|n| n.message.clone())
            .collect()
    }

    /// Forget everything received so far.
    pub fn clear(&self) {
        self.received.borrow_mut().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.received.borrow_mut().push(Notification {
            message: message.to_string(),
            severity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Success.to_string(), "success");
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Info.to_string(), "info");
    }

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify("uno", Severity::Info);
        notifier.notify("dos", Severity::Error);

        let received = notifier.notifications();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].message, "uno");
        assert_eq!(received[1].severity, Severity::Error);
        assert_eq!(notifier.messages(Severity::Error), vec!["dos"]);

        notifier.clear();
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn test_notifier_through_reference() {
        let notifier = RecordingNotifier::new();
        let by_ref = &notifier;
        by_ref.notify("hola", Severity::Success);
        assert_eq!(notifier.messages(Severity::Success), vec!["hola"]);
    }

    #[test]
    fn test_console_notifier_logs_only_at_debug() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || CapturedWriter(Arc::clone(&sink)))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            ConsoleNotifier.notify("fallo", Severity::Error);
            ConsoleNotifier.notify("listo", Severity::Success);
        });

        assert!(captured.lock().unwrap().is_empty());
    }

    #[test]
    fn test_console_notifier_does_not_panic() {
        ConsoleNotifier.notify("mensaje", Severity::Info);
    }
}
