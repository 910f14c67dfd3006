use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

#[derive(clap::Parser, Debug)]
pub struct AppConfig {
    // App configs
    #[clap(long, env)]
    pub app_application_port: u16,

    #[clap(long, env)]
    pub app_application_host: String,

    // Database configs
    #[clap(long, env)]
    pub db_host: String,

    #[clap(long, env, default_value_t = 5432)]
    pub db_port: u16,

    #[clap(long, env)]
    pub db_username: String,

    #[clap(long, env)]
    pub db_password: SecretString,

    #[clap(long, env)]
    pub db_name: String,

    #[clap(long, env, default_value_t = false)]
    pub db_require_ssl: bool,

    // Brevo transactional email
    #[clap(long, env)]
    pub brevo_api_key: SecretString,

    #[clap(long, env, default_value = "https://api.brevo.com/v3")]
    pub brevo_base_url: String,

    /// Sender address of every outgoing email
    #[clap(long, env)]
    pub mail_id: String,

    #[clap(long, env, default_value = "OTP Service")]
    pub mail_sender_name: String,

    // OTP
    #[clap(long, env, default_value_t = 5)]
    pub otp_validity_minutes: i64,
}

impl AppConfig {
    pub fn db_connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.db_require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_username)
            .password(self.db_password.expose_secret())
            .database(&self.db_name)
            .ssl_mode(ssl_mode)
    }

    /// How long an issued OTP can be used for a password reset.
    pub fn otp_validity(&self) -> time::Duration {
        time::Duration::minutes(self.otp_validity_minutes)
    }
}
