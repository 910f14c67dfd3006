use rand::Rng;

use super::OtpManager;
use crate::app::email::{client::EmailClient, template::PasswordResetOtpData};

pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;

pub struct PasswordResetOtp {
    pub validity: time::Duration,
}

impl PasswordResetOtp {
    #[tracing::instrument(name = "Sending password reset OTP email", skip_all, fields(email = ?email))]
    pub async fn send_email(
        &self,
        client: &EmailClient,
        code: &str,
        email: &str,
    ) -> anyhow::Result<()> {
        let data = PasswordResetOtpData {
            code: code.to_string(),
            expire_in_minutes: self.validity.whole_minutes(),
        };

        let email_content = client.build_password_reset_otp(&data);
        client.send_email(email, email_content).await?;

        Ok(())
    }
}

impl OtpManager for PasswordResetOtp {
    #[tracing::instrument(name = "Generating password reset OTP", skip_all)]
    fn generate_otp(&self) -> String {
        let code = rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX);

        format!("{:06}", code)
    }
}
