use serde::Serialize;

#[derive(Debug)]
pub enum EmailTemplates {
    PasswordResetOtp,
}

impl EmailTemplates {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::PasswordResetOtp => "Your OTP Code",
        }
    }
}

#[derive(Serialize)]
pub struct PasswordResetOtpData {
    pub code: String,
    pub expire_in_minutes: i64,
}

impl PasswordResetOtpData {
    pub fn render_html(&self) -> String {
        format!(
            r#"<div style="font-family: Arial">
  <h2>Your OTP Code</h2>
  <h1 style="color:#4CAF50">{}</h1>
  <p>This OTP is valid for {} minutes.</p>
</div>"#,
            self.code, self.expire_in_minutes
        )
    }
}
