use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::{NewOtp, OtpConsumption, OtpRecord, OtpStore, User, UserStore};

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        PgUserStore { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[tracing::instrument(name = "Get user by email", skip_all)]
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
                select user_id, email, password_hash
                from "user"
                where email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("failed to retrieve user")?;

        Ok(user)
    }

    #[tracing::instrument(name = "Update user password hash", skip_all, fields(user_id = %user_id))]
    async fn update_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
                update "user"
                set password_hash = $1
                where user_id = $2
            "#,
        )
        .bind(password_hash)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("failed to update password hash")?;

        if res.rows_affected() == 0 {
            anyhow::bail!("no user with id {}", user_id);
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct PgOtpStore {
    pool: PgPool,
}

impl PgOtpStore {
    pub fn new(pool: PgPool) -> Self {
        PgOtpStore { pool }
    }
}

#[async_trait]
impl OtpStore for PgOtpStore {
    #[tracing::instrument(name = "Storing OTP", skip_all)]
    async fn create(&self, otp: NewOtp) -> anyhow::Result<()> {
        sqlx::query(
            r#"
                insert into otp (email, code, created_at, is_expired)
                values ($1, $2, $3, $4)
            "#,
        )
        .bind(otp.email)
        .bind(otp.code)
        .bind(otp.created_at)
        .bind(otp.is_expired)
        .execute(&self.pool)
        .await
        .context("failed to store otp")?;

        Ok(())
    }

    #[tracing::instrument(name = "Consume OTP", skip_all)]
    async fn consume(
        &self,
        email: &str,
        code: &str,
        validity: Duration,
    ) -> anyhow::Result<OtpConsumption> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        // Row lock makes a concurrent consumer wait, it then finds the row deleted.
        let record = sqlx::query_as::<_, OtpRecord>(
            r#"
                select otp_id, email, code, created_at, is_expired
                from otp
                where email = $1 and code = $2
                order by created_at desc
                limit 1
                for update
            "#,
        )
        .bind(email)
        .bind(code)
        .fetch_optional(&mut *tx)
        .await
        .context("failed to retrieve otp")?;

        let Some(record) = record else {
            return Ok(OtpConsumption::Missing);
        };

        if record.has_expired(OffsetDateTime::now_utc(), validity) {
            return Ok(OtpConsumption::Expired);
        }

        sqlx::query("delete from otp where email = $1")
            .bind(email)
            .execute(&mut *tx)
            .await
            .context("failed to delete otps")?;

        tx.commit().await.context("failed to commit otp consumption")?;

        Ok(OtpConsumption::Consumed(record))
    }
}
