//! User-facing messages and confirmations

use tracing::{error, warn};

/// Toasts and confirmation dialogs
pub trait UserFeedback: Send + Sync {
    /// Show an error to the user
    fn error(&self, message: &str);

    /// Ask the user a yes/no question
    fn confirm(&self, message: &str) -> bool;
}

/// Headless feedback: logs errors, declines every confirmation
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFeedback;

impl UserFeedback for TracingFeedback {
    fn error(&self, message: &str) {
        error!(%message, "user-facing error");
    }

    fn confirm(&self, message: &str) -> bool {
        warn!(%message, "confirmation requested without a user; declining");
        false
    }
}

/// Accepts every confirmation; for scripted sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl UserFeedback for AutoConfirm {
    fn error(&self, message: &str) {
        error!(%message, "user-facing error");
    }

    fn confirm(&self, _message: &str) -> bool {
        true
    }
}
