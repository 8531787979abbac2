use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;
const HISTORY_LIMIT: usize = 100;

pub const DEFAULT_TOAST_MS: u64 = 3_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub message: String,
}

/// Publishing side of the notification queue.
///
/// Controllers only say that something happened; how and for how long it is
/// shown is up to whoever subscribes (see [`ToastBoard`]).
#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Toast>,
    history: Arc<Mutex<VecDeque<Toast>>>,
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            history: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }

    pub fn publish(&self, kind: ToastKind, message: impl Into<String>) -> Toast {
        let toast = Toast {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
        };
        log::debug!("toast [{}] {}", kind.as_str(), toast.message);

        {
            let mut history = self
                .history
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if history.len() == HISTORY_LIMIT {
                history.pop_front();
            }
            history.push_back(toast.clone());
        }

        // No subscriber is fine: the history still records the toast.
        let _ = self.sender.send(toast.clone());
        toast
    }

    pub fn success(&self, message: impl Into<String>) -> Toast {
        self.publish(ToastKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Toast {
        self.publish(ToastKind::Error, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Toast {
        self.publish(ToastKind::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Toast {
        self.publish(ToastKind::Warning, message)
    }

    /// Every toast published so far, oldest first.
    pub fn history(&self) -> Vec<Toast> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn last(&self) -> Option<Toast> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .back()
            .cloned()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct ShownToast {
    toast: Toast,
    expires_at: Instant,
}

/// Rendering consumer: keeps the toasts that are currently on screen and
/// drops each one once its dismiss delay has elapsed.
pub struct ToastBoard {
    receiver: broadcast::Receiver<Toast>,
    dismiss_after: Duration,
    shown: Vec<ShownToast>,
}

impl ToastBoard {
    pub fn new(notifier: &Notifier, dismiss_after: Duration) -> Self {
        Self {
            receiver: notifier.subscribe(),
            dismiss_after,
            shown: Vec::new(),
        }
    }

    /// Pulls pending toasts off the queue without waiting.
    pub fn drain(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(toast) => self.show(toast),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    log::warn!("toast board lagged, {} notifications skipped", skipped);
                }
                Err(_) => break,
            }
        }
    }

    /// Waits for the next toast; `None` once every notifier is gone.
    pub async fn next(&mut self) -> Option<Toast> {
        loop {
            match self.receiver.recv().await {
                Ok(toast) => {
                    self.show(toast.clone());
                    return Some(toast);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("toast board lagged, {} notifications skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn show(&mut self, toast: Toast) {
        self.shown.push(ShownToast {
            toast,
            expires_at: Instant::now() + self.dismiss_after,
        });
    }

    pub fn visible(&mut self) -> Vec<Toast> {
        self.drain();
        let now = Instant::now();
        self.shown.retain(|shown| shown.expires_at > now);
        self.shown.iter().map(|shown| shown.toast.clone()).collect()
    }
}
