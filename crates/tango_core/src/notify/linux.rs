use crate::error::AppError;
use crate::notify::{Notice, Notifier, Severity};
use notify_rust::{Notification, Timeout, Urgency};

const DESTRUCTIVE_TIMEOUT_MS: u32 = 8_000;

pub struct LinuxNotifier;

/// Notices stay transient; critical urgency would pin them until dismissed.
fn display_hints(severity: Severity) -> (Urgency, Timeout) {
    match severity {
        Severity::Destructive => (
            Urgency::Normal,
            Timeout::Milliseconds(DESTRUCTIVE_TIMEOUT_MS),
        ),
    }
}

impl Notifier for LinuxNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        let (urgency, timeout) = display_hints(notice.severity);
        let mut notification = Notification::new();
        notification.appname("tasktango");
        notification.summary(&notice.title);
        notification.body(&notice.description);
        notification.urgency(urgency);
        notification.timeout(timeout);

        notification
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
