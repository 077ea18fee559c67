//! User-facing notifications.

use std::sync::{Mutex, PoisonError};

use crate::error::{ClientError, ErrorClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);

    fn success(&self, message: &str) {
        self.notify(Toast {
            kind: ToastKind::Success,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Toast {
            kind: ToastKind::Error,
            message: message.to_string(),
        });
    }

    fn info(&self, message: &str) {
        self.notify(Toast {
            kind: ToastKind::Info,
            message: message.to_string(),
        });
    }
}

/// Notifier that keeps every toast, newest last.
#[derive(Debug, Default)]
pub struct ToastLog {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts().pop()
    }
}

impl Notifier for ToastLog {
    fn notify(&self, toast: Toast) {
        tracing::debug!(kind = ?toast.kind, message = %toast.message, "toast");
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(toast);
    }
}

pub const NETWORK_ERROR_MESSAGE: &str = "Can't reach Tropiqk right now. Check your connection.";
pub const SERVER_ERROR_MESSAGE: &str = "Something went wrong on our side. Please try again later.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Friendlier wording for messages the API is known to send.
const MESSAGES: &[(&str, &str)] = &[
    ("Invalid credentials", "Incorrect email or password."),
    ("User not found", "No account matches that email."),
    ("Email already exists", "An account with this email already exists."),
    ("Username already taken", "That username is taken. Try another one."),
    ("Invalid verification code", "That code is not right. Check your email and try again."),
    ("Verification code expired", "That code has expired. Request a new one."),
    ("Incorrect password", "Your current password is incorrect."),
    ("Upload limit reached", "You've reached your upload limit for now."),
    ("File too large", "That file is too large."),
    ("Unsupported file type", "That file type isn't supported."),
];

/// The message to show for `err`.
pub fn user_message(err: &ClientError) -> String {
    match err.class() {
        ErrorClass::Network => NETWORK_ERROR_MESSAGE.to_string(),
        ErrorClass::Server => SERVER_ERROR_MESSAGE.to_string(),
        ErrorClass::AuthTerminal if err.code().is_none() => SESSION_EXPIRED_MESSAGE.to_string(),
        _ => {
            let raw = match err {
                ClientError::Api { message, .. } => message.as_str(),
                other => return other.to_string(),
            };
            MESSAGES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(raw))
                .map(|(_, friendly)| friendly.to_string())
                .unwrap_or_else(|| raw.to_string())
        }
    }
}

/// Toasts `err` unless it is a form validation error; those belong next to
/// the fields, not in a toast.
pub fn report_error(notifier: &dyn Notifier, err: &ClientError) {
    if err.class() == ErrorClass::Validation {
        return;
    }
    notifier.error(&user_message(err));
}
