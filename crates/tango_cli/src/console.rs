use tango_core::error::AppError;
use tango_core::notify::{Notice, Notifier};
use tracing::debug;

/// Prints notices to stderr, then forwards them to a desktop notifier.
///
/// Delivery failures of the forwarded notifier are logged and otherwise ignored.
pub struct ConsoleNotifier {
    forward: Box<dyn Notifier>,
}

impl ConsoleNotifier {
    pub fn new(forward: Box<dyn Notifier>) -> Self {
        Self { forward }
    }
}

pub fn alert_line(notice: &Notice) -> String {
    format!("ALERT: {} - {}", notice.title, notice.description)
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        eprintln!("{}", alert_line(notice));
        if let Err(err) = self.forward.notify(notice) {
            debug!(error = %err, "desktop notification not delivered");
        }
        Ok(())
    }
}
