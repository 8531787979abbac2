use std::future::Future;

use reqwest::StatusCode;
use thiserror::Error;

use crate::api::{ApiError, ErrorKind};
use crate::i18n::I18n;
use crate::notify::Notifier;

/// Describes one user-facing operation: what to say when it works and what
/// to fall back to when it does not.
#[derive(Clone, Copy, Debug)]
pub struct Action {
    pub name: &'static str,
    pub success: Option<&'static str>,
    pub failed: &'static str,
    pub error: &'static str,
    pub quiet: bool,
}

impl Action {
    pub const fn new(name: &'static str, failed: &'static str, error: &'static str) -> Self {
        Self {
            name,
            success: None,
            failed,
            error,
            quiet: false,
        }
    }

    pub const fn with_success(mut self, key: &'static str) -> Self {
        self.success = Some(key);
        self
    }

    /// Failures are logged but not shown to the user.
    pub const fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Failure {
    /// Rejected locally, no request was sent.
    #[error("{0}")]
    Validation(String),
    #[error("{message}")]
    Server { status: StatusCode, message: String },
    #[error("{message}")]
    Transport { message: String },
}

impl Failure {
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) => message,
            Self::Server { message, .. } | Self::Transport { message } => message,
        }
    }
}

pub type Outcome<T> = Result<T, Failure>;

/// Runs requests for the controllers and turns their results into toasts.
#[derive(Clone)]
pub struct Executor {
    notifier: Notifier,
    i18n: I18n,
}

impl Executor {
    pub fn new(notifier: Notifier, i18n: I18n) -> Self {
        Self { notifier, i18n }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn text(&self, key: &str) -> String {
        self.i18n.get(key)
    }

    pub async fn run<T, F>(&self, action: &Action, request: F) -> Outcome<T>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        match request.await {
            Ok(value) => {
                if let Some(key) = action.success {
                    self.notifier.success(self.i18n.get(key));
                }
                Ok(value)
            }
            Err(error) => {
                log::error!("{} failed: {}", action.name, error);
                let failure = self.classify(action, &error);
                if !action.quiet {
                    self.notifier.error(failure.message());
                }
                Err(failure)
            }
        }
    }

    /// Reports a validation problem found before any request was made.
    pub fn reject(&self, key: &str) -> Failure {
        let message = self.i18n.get(key);
        log::warn!("validation failed: {}", message);
        self.notifier.error(message.clone());
        Failure::Validation(message)
    }

    fn classify(&self, action: &Action, error: &ApiError) -> Failure {
        match (error.kind(), error) {
            (ErrorKind::Server, ApiError::Server { status, message }) => Failure::Server {
                status: *status,
                message: message
                    .clone()
                    .unwrap_or_else(|| self.i18n.get(action.failed)),
            },
            _ => Failure::Transport {
                message: self.i18n.get(action.error),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{server_error, transport_error};
    use crate::notify::ToastKind;

    const ADD: Action =
        Action::new("add medicine", "medicine_add_failed", "medicine_add_error")
            .with_success("medicine_added");

    fn executor() -> Executor {
        Executor::new(Notifier::new(), I18n::default())
    }

    #[tokio::test]
    async fn success_publishes_success_toast() {
        let executor = executor();
        let value = executor.run(&ADD, async { Ok::<_, ApiError>(5) }).await;
        assert_eq!(value, Ok(5));

        let toast = executor.notifier().last().unwrap();
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, "Medicine added successfully!");
    }

    #[tokio::test]
    async fn server_message_is_shown_verbatim() {
        let executor = executor();
        let result: Outcome<()> = executor
            .run(&ADD, async {
                Err(server_error(400, Some("Batch number already exists")))
            })
            .await;

        assert_eq!(
            result.unwrap_err().message(),
            "Batch number already exists"
        );
        assert_eq!(
            executor.notifier().last().unwrap().message,
            "Batch number already exists"
        );
    }

    #[tokio::test]
    async fn server_without_message_uses_fallback() {
        let executor = executor();
        let result: Outcome<()> = executor
            .run(&ADD, async { Err(server_error(500, None)) })
            .await;
        assert_eq!(result.unwrap_err().message(), "Failed to add medicine");
    }

    #[tokio::test]
    async fn transport_failure_uses_generic_text() {
        let executor = executor();
        let result: Outcome<()> = executor.run(&ADD, async { Err(transport_error()) }).await;
        assert!(matches!(result, Err(Failure::Transport { .. })));
        assert_eq!(
            executor.notifier().last().unwrap().message,
            "Error adding medicine"
        );
    }

    #[tokio::test]
    async fn quiet_actions_do_not_notify() {
        let executor = executor();
        let stats = Action::new("stats", "stats_load_failed", "stats_load_error").quiet();
        let result: Outcome<()> = executor.run(&stats, async { Err(transport_error()) }).await;
        assert!(result.is_err());
        assert!(executor.notifier().history().is_empty());
    }

    #[test]
    fn reject_notifies_without_request() {
        let executor = executor();
        let failure = executor.reject("sale_quantity_positive");
        assert_eq!(
            failure,
            Failure::Validation("Quantity must be greater than 0".to_string())
        );
        assert_eq!(executor.notifier().last().unwrap().kind, ToastKind::Error);
    }
}
