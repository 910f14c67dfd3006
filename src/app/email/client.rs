use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::template::{EmailTemplates, PasswordResetOtpData};

/// Rendered email, ready to be handed to [`EmailClient::send_email`].
#[derive(Debug)]
pub struct EmailContent {
    pub subject: String,
    pub html_content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest<'a> {
    sender: Contact<'a>,
    to: [Contact<'a>; 1],
    subject: &'a str,
    html_content: &'a str,
}

#[derive(Serialize)]
struct Contact<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

/// Brevo transactional email client.
pub struct EmailClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    sender_email: String,
    sender_name: String,
}

impl EmailClient {
    /// Build an email client
    ///
    /// It should only be called once, and shared
    pub fn new(
        http_client: reqwest::Client,
        base_url: String,
        api_key: SecretString,
        sender_email: String,
        sender_name: String,
    ) -> Self {
        EmailClient {
            http_client,
            base_url,
            api_key,
            sender_email,
            sender_name,
        }
    }

    #[tracing::instrument(name = "Building password reset OTP email content", skip_all)]
    pub fn build_password_reset_otp(&self, data: &PasswordResetOtpData) -> EmailContent {
        EmailContent {
            subject: EmailTemplates::PasswordResetOtp.subject().to_string(),
            html_content: data.render_html(),
        }
    }

    #[tracing::instrument(name = "Sending email", skip_all, fields(email = ?email))]
    pub async fn send_email(&self, email: &str, email_content: EmailContent) -> anyhow::Result<()> {
        let url = format!("{}/smtp/email", self.base_url.trim_end_matches('/'));
        let body = SendEmailRequest {
            sender: Contact {
                email: &self.sender_email,
                name: Some(&self.sender_name),
            },
            to: [Contact { email, name: None }],
            subject: &email_content.subject,
            html_content: &email_content.html_content,
        };

        self.http_client
            .post(&url)
            .header("api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .context("failed to reach email provider")?
            .error_for_status()
            .with_context(|| format!("email provider rejected email to {}", email))?;

        Ok(())
    }
}
