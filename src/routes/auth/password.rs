use axum::{extract::State, Json};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use time::OffsetDateTime;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    app::{
        error::{AppError, MessageResponse},
        extrator::ValidatedJson,
        otp::{password_reset_otp::PasswordResetOtp, OtpManager},
        password::compute_password_hash,
        store::{NewOtp, OtpConsumption},
        ApiContext,
    },
    routes::docs::AUTH_TAG,
};

const ALL_FIELDS_REQUIRED: &str = "All fields are required";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IssueOtpInput {
    #[validate(
        required(message = "Email is required"),
        length(min = 1, message = "Email is required")
    )]
    email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_reset_input"))]
pub struct ResetPasswordInput {
    email: Option<String>,
    otp: Option<String>,
    #[schema(value_type = Option<String>)]
    new_password: Option<SecretString>,
}

impl ResetPasswordInput {
    /// Absent fields become empty, call after validation only.
    fn into_parts(self) -> (String, String, SecretString) {
        (
            self.email.unwrap_or_default(),
            self.otp.unwrap_or_default(),
            self.new_password.unwrap_or_else(|| SecretString::from(String::new())),
        )
    }
}

fn validate_reset_input(input: &ResetPasswordInput) -> Result<(), ValidationError> {
    let present = |value: Option<&str>| value.is_some_and(|v| !v.is_empty());

    let complete = present(input.email.as_deref())
        && present(input.otp.as_deref())
        && present(input.new_password.as_ref().map(|p| p.expose_secret()));

    if !complete {
        return Err(ValidationError::new("required").with_message(ALL_FIELDS_REQUIRED.into()));
    }

    Ok(())
}

#[utoipa::path(
    post,
    path = "/otp",
    tag = AUTH_TAG,
    request_body = IssueOtpInput,
    responses(
        (status = 200, description = "OTP sent", body = MessageResponse),
        (status = 400, description = "Email missing", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
#[tracing::instrument(name = "Issue password reset OTP", skip_all, fields(email = ?req.email))]
pub async fn issue_otp(
    ctx: State<ApiContext>,
    ValidatedJson(req): ValidatedJson<IssueOtpInput>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.unwrap_or_default();
    let user = ctx
        .users
        .find_by_email(&email)
        .await?
        .ok_or(AppError::NotFound)?;

    let otp_manager = PasswordResetOtp {
        validity: ctx.config.otp_validity(),
    };
    let code = otp_manager.generate_otp();

    // Stored before sending, a failed send leaves the record in place.
    ctx.otps
        .create(NewOtp {
            email: user.email,
            code: code.clone(),
            created_at: OffsetDateTime::now_utc(),
            is_expired: false,
        })
        .await?;

    otp_manager
        .send_email(&ctx.email_client, &code, &email)
        .await?;

    tracing::info!("OTP email sent");

    Ok(Json(MessageResponse::new("OTP sent successfully")))
}

#[utoipa::path(
    post,
    path = "/reset-password",
    tag = AUTH_TAG,
    request_body = ResetPasswordInput,
    responses(
        (status = 200, description = "Successfully updated the password", body = MessageResponse),
        (status = 400, description = "Missing field, invalid or expired OTP", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
#[tracing::instrument(name = "Reset password with OTP", skip_all, fields(email = ?req.email))]
pub async fn reset_password(
    ctx: State<ApiContext>,
    ValidatedJson(req): ValidatedJson<ResetPasswordInput>,
) -> Result<Json<MessageResponse>, AppError> {
    let (email, otp, new_password) = req.into_parts();

    match ctx
        .otps
        .consume(&email, &otp, ctx.config.otp_validity())
        .await?
    {
        OtpConsumption::Consumed(_) => (),
        OtpConsumption::Expired => return Err(AppError::ExpiredOtp),
        OtpConsumption::Missing => return Err(AppError::InvalidOtp),
    }

    let user = ctx
        .users
        .find_by_email(&email)
        .await?
        .ok_or(AppError::NotFound)?;

    let password_hash = compute_password_hash(new_password).await?;
    ctx.users
        .update_password_hash(user.user_id, &password_hash)
        .await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}
