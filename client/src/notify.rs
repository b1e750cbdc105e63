//! Summary notifications toward the presentation layer.

/// Receives the one-line summary of each completed or failed cycle.
pub trait Notifier: Send + Sync {
    /// Deliver one summary message.
    fn notify(&self, message: &str);
}

/// Notifier that routes summaries to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(target: "quotesync::notify", "{message}");
    }
}
