use validator::Validate;

use super::TropiqkApi;
use crate::error::ClientError;
use crate::models::auth::{UserEnvelope, UserMessageResponse};
use crate::models::{
    EmailChangeRequest, MessageResponse, PendingEmailChange, UpdateUsernameRequest, User,
    VerifyEmailChangeRequest,
};
use crate::services::transport::ApiRequest;

impl TropiqkApi {
    pub async fn get_user(&self) -> Result<User, ClientError> {
        let envelope: UserEnvelope = self.call(ApiRequest::get("/api/user/get-user")).await?;
        Ok(envelope.user)
    }

    pub async fn update_username(
        &self,
        request: &UpdateUsernameRequest,
    ) -> Result<UserMessageResponse, ClientError> {
        request.validate()?;
        self.call(ApiRequest::put("/api/user/update-username").json(request)?)
            .await
    }

    /// Starts an email change; the API mails a code to the new address.
    pub async fn request_email_change(
        &self,
        request: &EmailChangeRequest,
    ) -> Result<MessageResponse, ClientError> {
        request.validate()?;
        self.call(ApiRequest::put("/api/user/request-email-change").json(request)?)
            .await
    }

    pub async fn verify_email_change(
        &self,
        request: &VerifyEmailChangeRequest,
    ) -> Result<UserMessageResponse, ClientError> {
        request.validate()?;
        self.call(ApiRequest::post("/api/user/verify-email-change").json(request)?)
            .await
    }

    pub async fn resend_email_change_code(&self) -> Result<MessageResponse, ClientError> {
        self.call(ApiRequest::post("/api/user/resend-verification"))
            .await
    }

    pub async fn pending_email_change(&self) -> Result<PendingEmailChange, ClientError> {
        self.call(ApiRequest::get("/api/user/pending-email-change"))
            .await
    }

    pub async fn cancel_email_change(&self) -> Result<MessageResponse, ClientError> {
        self.call(ApiRequest::delete("/api/user/cancel-email-change"))
            .await
    }
}
