pub mod config;
pub mod controller;
pub mod draft;
pub mod error;
pub mod model;
pub mod notify;
pub mod store;
pub mod suggest;

#[cfg(test)]
mod tests {
    use crate::controller::ViewController;
    use crate::error::AppError;
    use crate::notify::NoopNotifier;
    use crate::suggest::UnconfiguredClient;
    use std::sync::Arc;

    #[tokio::test]
    async fn unconfigured_controller_still_accepts_tasks() {
        let mut controller = ViewController::new(Arc::new(UnconfiguredClient), Box::new(NoopNotifier));
        controller.set_draft_text("demo");
        controller.submit().unwrap();

        let outcomes = controller.settle().await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(controller.tasks().len(), 1);
        assert!(controller.last_suggestion().is_none());
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::invalid_input("missing text");
        assert_eq!(err.code(), "invalid_input");
    }
}
