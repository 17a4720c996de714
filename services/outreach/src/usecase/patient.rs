use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use clinic_domain::pagination::{Page, PageRequest};
use clinic_domain::status::PatientStatus;
use clinic_domain::validation::ValidationErrors;

use crate::domain::repository::{PatientRepository, UserRepository};
use crate::domain::types::{
    DayWindow, PATIENT_PAGE_SIZE, Patient, PatientQuery, PatientSortBy, PatientWithHistory,
    status_filter_from_param,
};
use crate::error::OutreachServiceError;

// ── CreatePatient ────────────────────────────────────────────────────────────

/// Already validated and trimmed by the request body rules.
#[derive(Debug, Clone)]
pub struct CreatePatientInput {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub appointment_at: Option<DateTime<Utc>>,
}

pub struct CreatePatientUseCase<U: UserRepository, P: PatientRepository> {
    pub users: U,
    pub patients: P,
}

impl<U: UserRepository, P: PatientRepository> CreatePatientUseCase<U, P> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: CreatePatientInput,
    ) -> Result<Patient, OutreachServiceError> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(OutreachServiceError::UserNotFound);
        }

        let now = Utc::now();
        let patient = Patient {
            id: Uuid::now_v7(),
            user_id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            appointment_at: input.appointment_at,
            status: PatientStatus::Pending,
            last_sent_at: None,
            created_at: now,
            updated_at: now,
        };
        self.patients.create(&patient).await?;
        Ok(patient)
    }
}

// ── GetPatient ───────────────────────────────────────────────────────────────

pub struct GetPatientUseCase<P: PatientRepository> {
    pub repo: P,
}

impl<P: PatientRepository> GetPatientUseCase<P> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        patient_id: Uuid,
    ) -> Result<PatientWithHistory, OutreachServiceError> {
        self.repo
            .find_with_history(user_id, patient_id)
            .await?
            .ok_or(OutreachServiceError::PatientNotFound)
    }
}

// ── ListPatients ─────────────────────────────────────────────────────────────

/// Raw table filters as received from the query string.
#[derive(Debug, Default)]
pub struct ListPatientsInput {
    /// `true`/`1`/`yes` or `false`/`0`/`no`, any case. Absent means enabled.
    pub today_only: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    pub page: Option<u32>,
}

pub struct ListPatientsUseCase<P: PatientRepository> {
    pub repo: P,
    pub timezone: Tz,
}

impl<P: PatientRepository> ListPatientsUseCase<P> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: ListPatientsInput,
        now: DateTime<Utc>,
    ) -> Result<Page<PatientWithHistory>, OutreachServiceError> {
        let mut errors = ValidationErrors::new();
        let status = status_filter_from_param(input.status.as_deref()).unwrap_or_else(|_| {
            errors.add("status", "must be one of pending, sent, completed, failed, all");
            None
        });
        let sort_by = PatientSortBy::from_params(input.sort_by.as_deref(), input.sort_dir.as_deref())
            .unwrap_or_else(|| {
                errors.add("sortBy", "must be name, appointment_at or last_sent with asc or desc");
                PatientSortBy::default()
            });
        let today_only = parse_flag(input.today_only.as_deref(), true).unwrap_or_else(|| {
            errors.add("today_only", "must be true or false");
            true
        });
        errors.into_result()?;

        let query = PatientQuery {
            today: today_only.then(|| DayWindow::containing(self.timezone, now)),
            status,
            search: input
                .search
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty()),
            sort_by,
        };

        let page = PageRequest::new(PATIENT_PAGE_SIZE, input.page.unwrap_or(1)).clamped();
        let (rows, total) = self.repo.list(user_id, &query, page).await?;
        Ok(Page::new(rows, page, total))
    }
}

fn parse_flag(raw: Option<&str>, default: bool) -> Option<bool> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Some(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
