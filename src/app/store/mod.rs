use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub mod memory;
pub mod postgres;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// OTP about to be persisted by the issuer.
#[derive(Debug, Clone)]
pub struct NewOtp {
    pub email: String,
    pub code: String,
    pub created_at: OffsetDateTime,
    pub is_expired: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OtpRecord {
    pub otp_id: Uuid,
    pub email: String,
    pub code: String,
    pub created_at: OffsetDateTime,
    pub is_expired: bool,
}

impl OtpRecord {
    /// A record is dead once flagged, or once `validity` has passed since creation.
    pub fn has_expired(&self, now: OffsetDateTime, validity: Duration) -> bool {
        self.is_expired || now >= self.created_at + validity
    }
}

impl From<NewOtp> for OtpRecord {
    fn from(otp: NewOtp) -> Self {
        OtpRecord {
            otp_id: Uuid::new_v4(),
            email: otp.email,
            code: otp.code,
            created_at: otp.created_at,
            is_expired: otp.is_expired,
        }
    }
}

/// Outcome of [`OtpStore::consume`].
#[derive(Debug)]
pub enum OtpConsumption {
    /// The latest matching record was valid, every record of the email is gone.
    Consumed(OtpRecord),
    /// The latest matching record has expired, nothing was deleted.
    Expired,
    /// No record matches the email and code.
    Missing,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Errors when no user has `user_id`.
    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str)
        -> anyhow::Result<()>;
}

#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn create(&self, otp: NewOtp) -> anyhow::Result<()>;

    /// Check the latest record matching `email` and `code` and, if it is still
    /// valid, delete all records of `email`.
    ///
    /// Check and delete happen as one atomic step: of two callers racing
    /// with the same code only one sees `Consumed`.
    async fn consume(
        &self,
        email: &str,
        code: &str,
        validity: Duration,
    ) -> anyhow::Result<OtpConsumption>;
}
