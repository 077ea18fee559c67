//! Email change wizard: request, confirm the emailed code, or cancel.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::ClientError;
use crate::models::{EmailChangeRequest, VerifyEmailChangeRequest};
use crate::services::api::TropiqkApi;
use crate::services::feedback::{report_error, user_message, Notifier};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmailChangeStep {
    #[default]
    Idle,
    AwaitingCode,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailChangeState {
    pub step: EmailChangeStep,
    pub pending_email: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub submitting: bool,
    pub error: Option<String>,
}

pub struct EmailChangeFlow {
    api: TropiqkApi,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<EmailChangeState>,
}

impl EmailChangeFlow {
    pub fn new(api: TropiqkApi, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            state: watch::channel(EmailChangeState::default()).0,
        }
    }

    pub fn state(&self) -> EmailChangeState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EmailChangeState> {
        self.state.subscribe()
    }

    /// Resumes a change started earlier, e.g. in another session.
    pub async fn load_pending(&self) -> Result<(), ClientError> {
        let pending = self
            .guarded(self.api.pending_email_change(), false)
            .await?;

        self.state.send_modify(|s| {
            if pending.is_active_at(Utc::now()) {
                s.step = EmailChangeStep::AwaitingCode;
                s.pending_email = pending.pending_email;
                s.expires_at = pending.expires_at;
            } else {
                s.step = EmailChangeStep::Idle;
                s.pending_email = None;
                s.expires_at = None;
            }
        });
        Ok(())
    }

    pub async fn request(&self, request: &EmailChangeRequest) -> Result<(), ClientError> {
        let response = self
            .guarded(self.api.request_email_change(request), true)
            .await?;

        self.state.send_modify(|s| {
            s.step = EmailChangeStep::AwaitingCode;
            s.pending_email = Some(request.new_email.clone());
        });
        self.notifier.success(&or_default(
            Some(response.message),
            "We sent a verification code to your new email.",
        ));
        Ok(())
    }

    /// Confirms the code. The account record returned by the API replaces
    /// the session user so the new address shows everywhere.
    pub async fn verify(&self, code: &str) -> Result<(), ClientError> {
        let request = VerifyEmailChangeRequest {
            code: code.trim().to_string(),
        };
        let response = self
            .guarded(self.api.verify_email_change(&request), true)
            .await?;

        if let Some(user) = response.user {
            tracing::info!(user_id = %user.id, "Email address changed");
            self.api.interceptor().session().set_user(Some(user));
        }
        self.state.send_modify(|s| {
            s.step = EmailChangeStep::Completed;
            s.pending_email = None;
            s.expires_at = None;
        });
        self.notifier.success(&or_default(
            response.message,
            "Your email address has been updated.",
        ));
        Ok(())
    }

    pub async fn resend(&self) -> Result<(), ClientError> {
        let response = self
            .guarded(self.api.resend_email_change_code(), true)
            .await?;
        self.notifier
            .info(&or_default(Some(response.message), "A new code is on its way."));
        Ok(())
    }

    pub async fn cancel(&self) -> Result<(), ClientError> {
        self.guarded(self.api.cancel_email_change(), true).await?;
        self.state.send_replace(EmailChangeState::default());
        self.notifier.info("Email change cancelled.");
        Ok(())
    }

    /// Tracks `submitting`/`error` around one API call. Failures are
    /// toasted only when `toast` is set.
    async fn guarded<T>(
        &self,
        call: impl std::future::Future<Output = Result<T, ClientError>>,
        toast: bool,
    ) -> Result<T, ClientError> {
        self.state.send_modify(|s| {
            s.submitting = true;
            s.error = None;
        });

        let result = call.await;

        self.state.send_modify(|s| {
            s.submitting = false;
            if let Err(e) = &result {
                s.error = Some(user_message(e));
            }
        });
        if let (Err(e), true) = (&result, toast) {
            report_error(self.notifier.as_ref(), e);
        }
        result
    }
}

fn or_default(message: Option<String>, default: &str) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
