use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use clinic_domain::pagination::Sort;
use clinic_domain::status::{OutreachAttempt, PatientStatus, attempt_status};

/// Fixed page size of the patient table.
pub const PATIENT_PAGE_SIZE: u32 = 10;

/// Staff account owning a set of patients.
#[derive(Debug, Clone)]
pub struct ClinicUser {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Patient record with its cached outreach status.
#[derive(Debug, Clone)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub appointment_at: Option<DateTime<Utc>>,
    pub status: PatientStatus,
    pub last_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One reminder attempt.
#[derive(Debug, Clone)]
pub struct SmsMessage {
    pub id: Uuid,
    pub content: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SmsMessage {
    /// A message the provider accepted at `at`.
    pub fn sent(content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            content: content.into(),
            sent_at: Some(at),
            completed_at: None,
            failed_at: None,
            created_at: at,
        }
    }

    /// A message the provider rejected at `at`. Never counts as sent.
    pub fn failed(content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            content: content.into(),
            sent_at: None,
            completed_at: None,
            failed_at: Some(at),
            created_at: at,
        }
    }

    pub fn status(&self) -> PatientStatus {
        attempt_status(self)
    }
}

impl OutreachAttempt for SmsMessage {
    fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    fn failed_at(&self) -> Option<DateTime<Utc>> {
        self.failed_at
    }
}

/// A patient together with linked messages, most recent first.
#[derive(Debug, Clone)]
pub struct PatientWithHistory {
    pub patient: Patient,
    pub messages: Vec<SmsMessage>,
}

/// Late outcome reported against an existing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    Completed,
    Failed,
}

/// Sort options for the patient table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientSortBy {
    AppointmentAt(Sort),
    /// Last name, then first name.
    Name(Sort),
    /// Most recent outreach first; patients never contacted are excluded.
    LastSent,
}

impl Default for PatientSortBy {
    fn default() -> Self {
        Self::AppointmentAt(Sort::Asc)
    }
}

impl PatientSortBy {
    /// Parse the `sortBy` / `sortDir` query pair. Direction defaults to ascending
    /// and is ignored for `last_sent`.
    pub fn from_params(sort_by: Option<&str>, sort_dir: Option<&str>) -> Option<Self> {
        let dir = match sort_dir {
            None | Some("") => Sort::Asc,
            Some(s) => Sort::from_param(s)?,
        };
        match sort_by {
            None | Some("") | Some("appointment_at") => Some(Self::AppointmentAt(dir)),
            Some("name") => Some(Self::Name(dir)),
            Some("last_sent") => Some(Self::LastSent),
            Some(_) => None,
        }
    }
}

/// Parse the `status` query param; `all` and empty mean no filter.
pub fn status_filter_from_param(
    status: Option<&str>,
) -> Result<Option<PatientStatus>, clinic_domain::status::UnknownStatus> {
    match status {
        None | Some("") | Some("all") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

/// Half-open UTC interval covering one calendar day in the clinic's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// The clinic day containing `instant`.
    pub fn containing(tz: Tz, instant: DateTime<Utc>) -> Self {
        let date = instant.with_timezone(&tz).date_naive();
        let next = date.succ_opt().unwrap_or(date);
        Self {
            start: start_of_day(tz, date),
            end: start_of_day(tz, next),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn start_of_day(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    // Some zones skip local midnight on DST change; the day then starts an hour later.
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Split an instant into clinic-local `YYYY-MM-DD` and `HH:MM` strings.
pub fn local_date_and_time(tz: Tz, at: DateTime<Utc>) -> (String, String) {
    let local = at.with_timezone(&tz);
    (
        local.format("%Y-%m-%d").to_string(),
        local.format("%H:%M").to_string(),
    )
}

/// Filters applied to the patient table. All present filters are ANDed.
#[derive(Debug, Clone, Default)]
pub struct PatientQuery {
    pub today: Option<DayWindow>,
    pub status: Option<PatientStatus>,
    pub search: Option<String>,
    pub sort_by: PatientSortBy,
}

/// Counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_patients: u64,
    pub todays_appointments: u64,
    pub forms_sent_today: u64,
    pub pending_forms: u64,
}
