#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use clinic_domain::pagination::PageRequest;
use clinic_domain::status::PatientStatus;

use crate::domain::types::{
    ClinicUser, DashboardStats, DayWindow, MessageOutcome, Patient, PatientQuery,
    PatientWithHistory, SmsMessage,
};
use crate::error::{OutreachServiceError, ProviderError};

/// Repository for owning users.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClinicUser>, OutreachServiceError>;
    async fn find_by_email(&self, email: &str)
    -> Result<Option<ClinicUser>, OutreachServiceError>;
    async fn create(&self, user: &ClinicUser) -> Result<(), OutreachServiceError>;

    /// Delete a user with all their patients. Messages left without any linked
    /// patient are removed as well. Returns `true` if the user existed.
    async fn delete(&self, id: Uuid) -> Result<bool, OutreachServiceError>;
}

/// Repository for patients. Every read is scoped to the owning user.
pub trait PatientRepository: Send + Sync {
    async fn create(&self, patient: &Patient) -> Result<(), OutreachServiceError>;

    async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Patient>, OutreachServiceError>;

    async fn find_with_history(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<PatientWithHistory>, OutreachServiceError>;

    /// One page of matching patients plus the total match count.
    async fn list(
        &self,
        user_id: Uuid,
        query: &PatientQuery,
        page: PageRequest,
    ) -> Result<(Vec<PatientWithHistory>, u64), OutreachServiceError>;
}

/// Repository for message history mutations. Each call recomputes and persists
/// the cached status of the affected patients atomically.
pub trait OutreachRepository: Send + Sync {
    /// Insert `message`, link it to the patient and return the patient's new status.
    async fn record_attempt(
        &self,
        patient_id: Uuid,
        message: &SmsMessage,
    ) -> Result<PatientStatus, OutreachServiceError>;

    /// Apply a late outcome to a message linked to one of `user_id`'s patients.
    /// Returns `None` when no such message exists.
    async fn record_outcome(
        &self,
        user_id: Uuid,
        message_id: Uuid,
        outcome: MessageOutcome,
        at: DateTime<Utc>,
    ) -> Result<Option<SmsMessage>, OutreachServiceError>;
}

/// Aggregate counters for the dashboard.
pub trait DashboardRepository: Send + Sync {
    async fn stats(
        &self,
        user_id: Uuid,
        today: DayWindow,
    ) -> Result<DashboardStats, OutreachServiceError>;
}

/// Outbound SMS delivery.
pub trait SmsProvider: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), ProviderError>;
}
