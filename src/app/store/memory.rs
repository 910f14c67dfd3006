//! Process local stores, used when no database is around (tests, demos).

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::{NewOtp, OtpConsumption, OtpRecord, OtpStore, User, UserStore};

fn lock<T>(mutex: &Mutex<T>) -> anyhow::Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    /// Adds or replaces the user keyed by its email.
    pub fn insert(&self, user: User) -> anyhow::Result<()> {
        lock(&self.users)?.insert(user.email.clone(), user);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(lock(&self.users)?.get(email).cloned())
    }

    async fn update_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        let mut users = lock(&self.users)?;
        let user = users
            .values_mut()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| anyhow::anyhow!("no user with id {}", user_id))?;
        user.password_hash = password_hash.to_string();

        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryOtpStore {
    records: Mutex<Vec<OtpRecord>>,
}

impl MemoryOtpStore {
    /// Snapshot of the records of `email`, oldest first.
    pub fn records_for(&self, email: &str) -> anyhow::Result<Vec<OtpRecord>> {
        let mut records: Vec<OtpRecord> = lock(&self.records)?
            .iter()
            .filter(|r| r.email == email)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);

        Ok(records)
    }
}

fn latest<'a>(records: &'a [OtpRecord], email: &str, code: &str) -> Option<&'a OtpRecord> {
    records
        .iter()
        .filter(|r| r.email == email && r.code == code)
        .max_by_key(|r| r.created_at)
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn create(&self, otp: NewOtp) -> anyhow::Result<()> {
        lock(&self.records)?.push(otp.into());
        Ok(())
    }

    async fn consume(
        &self,
        email: &str,
        code: &str,
        validity: Duration,
    ) -> anyhow::Result<OtpConsumption> {
        let mut records = lock(&self.records)?;

        let record = match latest(&records, email, code) {
            Some(record) => record.clone(),
            None => return Ok(OtpConsumption::Missing),
        };

        if record.has_expired(OffsetDateTime::now_utc(), validity) {
            return Ok(OtpConsumption::Expired);
        }

        records.retain(|r| r.email != email);

        Ok(OtpConsumption::Consumed(record))
    }
}
