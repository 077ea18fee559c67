//! Sign-in, sign-up, email verification and sign-out.

use reqwest::Url;
use std::sync::Arc;

use crate::error::{codes, ClientError};
use crate::models::{LoginForm, RegisterForm, User, VerifyEmailRequest};
use crate::services::api::TropiqkApi;
use crate::services::feedback::{report_error, user_message, Notifier};
use crate::services::interceptor::REDIRECT_AFTER_LOGIN_KEY;
use crate::services::navigation::pathname;
use crate::services::profile::ArtistProfileStore;
use crate::utils::paths::{has_segment_prefix, LOGIN_PAGE, VERIFY_EMAIL_PAGE};

/// `/auth/verify-email?email=…`, with the address form-encoded.
pub fn verify_email_location(email: &str) -> String {
    match Url::parse("http://tropiqk.local").and_then(|base| base.join(VERIFY_EMAIL_PAGE)) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("email", email);
            format!("{}?{}", url.path(), url.query().unwrap_or_default())
        }
        Err(_) => VERIFY_EMAIL_PAGE.to_string(),
    }
}

/// Where a freshly signed-in user lands: the page they were bounced from,
/// when it lies in their own area, otherwise their dashboard.
fn landing_page(user: &User, remembered: Option<String>) -> String {
    remembered
        .filter(|location| has_segment_prefix(pathname(location), user.role.area_prefix()))
        .unwrap_or_else(|| user.role.dashboard_path().to_string())
}

/// The page to continue to after verification or onboarding.
fn home_page(user: &User) -> &'static str {
    match user.role.onboarding_path() {
        Some(onboarding) if !user.has_onboarded => onboarding,
        _ => user.role.dashboard_path(),
    }
}

pub struct AuthFlows {
    api: TropiqkApi,
    profile: ArtistProfileStore,
    notifier: Arc<dyn Notifier>,
}

impl AuthFlows {
    pub fn new(api: TropiqkApi, profile: ArtistProfileStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            profile,
            notifier,
        }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<User, ClientError> {
        let interceptor = self.api.interceptor();

        let response = match self.api.login(form).await {
            Ok(response) => response,
            Err(e) if e.code() == Some(codes::EMAIL_NOT_VERIFIED) => {
                tracing::info!(email = %form.email, "Sign-in blocked until email is verified");
                self.notifier.error(&user_message(&e));
                interceptor
                    .navigator()
                    .navigate(&verify_email_location(&form.email));
                return Err(e);
            }
            Err(e) => {
                report_error(self.notifier.as_ref(), &e);
                return Err(e);
            }
        };

        let user = response.user;
        interceptor.session().login(user.clone());
        self.notifier
            .success(&format!("Welcome back, {}!", user.username));

        let storage = interceptor.storage();
        let remembered = storage.get(REDIRECT_AFTER_LOGIN_KEY);
        storage.remove(REDIRECT_AFTER_LOGIN_KEY);
        interceptor
            .navigator()
            .navigate(&landing_page(&user, remembered));

        Ok(user)
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<(), ClientError> {
        let response = self.api.register(form).await.inspect_err(|e| {
            report_error(self.notifier.as_ref(), e);
        })?;

        let message = response
            .message
            .unwrap_or_else(|| "Account created. Check your email for a verification code.".into());
        self.notifier.success(&message);
        self.api
            .interceptor()
            .navigator()
            .navigate(&verify_email_location(&form.email));
        Ok(())
    }

    /// Confirms the emailed code. When the API signs the user in right away
    /// they continue to onboarding or their dashboard, otherwise to login.
    pub async fn verify_email(&self, request: &VerifyEmailRequest) -> Result<(), ClientError> {
        let response = self.api.verify_email(request).await.inspect_err(|e| {
            report_error(self.notifier.as_ref(), e);
        })?;

        let interceptor = self.api.interceptor();
        self.notifier.success("Email verified!");
        match response.user {
            Some(user) => {
                let next = home_page(&user);
                interceptor.session().login(user);
                interceptor.navigator().navigate(next);
            }
            None => interceptor.navigator().navigate(LOGIN_PAGE),
        }
        Ok(())
    }

    pub async fn resend_verification(&self, email: &str) -> Result<(), ClientError> {
        let response = self.api.resend_verification(email).await.inspect_err(|e| {
            report_error(self.notifier.as_ref(), e);
        })?;
        self.notifier.info(&response.message);
        Ok(())
    }

    /// Signs out locally even when the API call fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let interceptor = self.api.interceptor();
        let result = interceptor.session().logout(&self.api).await;

        self.profile.clear();
        interceptor.storage().remove(REDIRECT_AFTER_LOGIN_KEY);
        self.notifier.info("You have been signed out.");
        interceptor.navigator().navigate(LOGIN_PAGE);
        result
    }
}
