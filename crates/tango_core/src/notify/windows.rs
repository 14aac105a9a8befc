use crate::error::AppError;
use crate::notify::{Notice, Notifier, Severity};
use tauri_winrt_notification::{Duration, Toast};

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        let duration = match notice.severity {
            Severity::Destructive => Duration::Long,
        };
        let toast = Toast::new(Toast::POWERSHELL_APP_ID)
            .title(&notice.title)
            .text1(&notice.description)
            .duration(duration);

        toast.show().map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
