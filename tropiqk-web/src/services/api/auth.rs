use validator::Validate;

use super::TropiqkApi;
use crate::error::ClientError;
use crate::models::auth::{EmailRequest, UserMessageResponse};
use crate::models::{LoginForm, LoginResponse, MessageResponse, RegisterForm, VerifyEmailRequest};
use crate::services::transport::ApiRequest;

impl TropiqkApi {
    pub async fn register(&self, form: &RegisterForm) -> Result<UserMessageResponse, ClientError> {
        form.validate()?;
        self.call(ApiRequest::post("/api/auth/register").json(form)?)
            .await
    }

    /// Signs in. A 401 here is never refreshed: it means bad credentials or
    /// an unverified email.
    pub async fn login(&self, form: &LoginForm) -> Result<LoginResponse, ClientError> {
        form.validate()?;
        self.call(ApiRequest::post("/api/auth/login").json(form)?)
            .await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.call_unit(ApiRequest::post("/api/auth/logout")).await
    }

    pub async fn resend_verification(&self, email: &str) -> Result<MessageResponse, ClientError> {
        let body = EmailRequest {
            email: email.to_string(),
        };
        self.call(ApiRequest::post("/api/auth/resend-verification").json(&body)?)
            .await
    }

    pub async fn verify_email(
        &self,
        request: &VerifyEmailRequest,
    ) -> Result<UserMessageResponse, ClientError> {
        request.validate()?;
        self.call(ApiRequest::post("/api/auth/verify-email").json(request)?)
            .await
    }
}
