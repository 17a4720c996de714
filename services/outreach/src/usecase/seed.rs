//! Demo patient fixtures.
//!
//! Generation is pure: callers pass the RNG and the reference time, so a fixed
//! seed yields the same patients every run.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rand::RngExt;
use uuid::Uuid;

use clinic_domain::status::PatientStatus;

use crate::domain::repository::{OutreachRepository, PatientRepository};
use crate::domain::types::{Patient, SmsMessage};
use crate::error::OutreachServiceError;

pub const DEFAULT_DEMO_PATIENTS: usize = 100;

/// Number of drafts pinned to today at 11:00 so the default table view is never empty.
const TODAY_AT_ELEVEN: usize = 5;

const APPOINTMENT_SPREAD_DAYS: i64 = 14;

const FIRST_NAMES: &[&str] = &[
    "Olivia", "Liam", "Charlotte", "Noah", "Amelia", "Oliver", "Isla", "Jack", "Mia", "William",
    "Sofia", "Mateo", "Valentina", "Santiago", "Isabella", "Sebastián", "Camila", "Emma",
    "James", "Ava", "Lucas", "Harper", "Ethan", "Grace",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Jones", "Williams", "Brown", "Wilson", "Taylor", "Nguyen", "Martin", "García",
    "Rodríguez", "Martínez", "López", "Gómez", "Díaz", "Johnson", "Miller", "Davis", "Anderson",
    "Thompson", "White",
];

/// What outreach history a demo patient starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutreachPlan {
    None,
    Sent { at: DateTime<Utc> },
    Completed { sent_at: DateTime<Utc>, completed_at: DateTime<Utc> },
    Failed { at: DateTime<Utc> },
}

impl OutreachPlan {
    /// Status the patient ends up with once the plan is recorded.
    pub fn expected_status(&self) -> PatientStatus {
        match self {
            Self::None => PatientStatus::Pending,
            Self::Sent { .. } => PatientStatus::Sent,
            Self::Completed { .. } => PatientStatus::Completed,
            Self::Failed { .. } => PatientStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub appointment_at: Option<DateTime<Utc>>,
    pub outreach: OutreachPlan,
}

/// Generate `count` demo patients around `now` in the clinic timezone.
pub fn generate_drafts<R: RngExt + ?Sized>(
    rng: &mut R,
    count: usize,
    now: DateTime<Utc>,
    tz: Tz,
) -> Vec<PatientDraft> {
    let today = now.with_timezone(&tz).date_naive();
    let eleven = NaiveTime::from_hms_opt(11, 0, 0).unwrap_or(NaiveTime::MIN);

    let mut drafts: Vec<PatientDraft> = (0..count)
        .map(|i| {
            let first_name = pick(rng, FIRST_NAMES);
            let last_name = pick(rng, LAST_NAMES);
            let email = (rng.random_range(0..10) < 7).then(|| {
                format!(
                    "{}.{}{}@example.com",
                    ascii_slug(first_name),
                    ascii_slug(last_name),
                    i + 1
                )
            });

            let appointment_at = if i < TODAY_AT_ELEVEN {
                local_to_utc(tz, today.and_time(eleven))
            } else if rng.random_range(0..5) == 0 {
                None
            } else {
                let day = today
                    + Duration::days(
                        rng.random_range(-APPOINTMENT_SPREAD_DAYS..=APPOINTMENT_SPREAD_DAYS),
                    );
                let time = NaiveTime::from_hms_opt(
                    rng.random_range(8..17),
                    [0, 15, 30, 45][rng.random_range(0..4)],
                    0,
                )
                .unwrap_or(eleven);
                local_to_utc(tz, day.and_time(time))
            };

            PatientDraft {
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                email,
                phone: demo_phone(rng),
                appointment_at,
                outreach: outreach_plan(rng, now),
            }
        })
        .collect();

    // Fisher-Yates, so the pinned drafts do not always come first.
    for i in (1..drafts.len()).rev() {
        let j = rng.random_range(0..=i);
        drafts.swap(i, j);
    }
    drafts
}

fn pick<'a, R: RngExt + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

fn ascii_slug(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            other => other,
        })
        .filter(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_lowercase()
}

fn local_to_utc(tz: Tz, local: chrono::NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn digits<R: RngExt + ?Sized>(rng: &mut R, n: usize) -> String {
    (0..n)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Compact E.164: 45% Australian mobiles, 45% Colombian mobiles, 10% US numbers.
fn demo_phone<R: RngExt + ?Sized>(rng: &mut R) -> String {
    match rng.random_range(0..100) {
        0..45 => format!("+614{}", digits(rng, 8)),
        45..90 => format!("+573{}", digits(rng, 9)),
        _ => format!("+1{}{}", rng.random_range(201..=989), digits(rng, 7)),
    }
}

fn outreach_plan<R: RngExt + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> OutreachPlan {
    let sent_at = now - Duration::minutes(rng.random_range(30..72 * 60));
    match rng.random_range(0..4) {
        0 => OutreachPlan::None,
        1 => OutreachPlan::Sent { at: sent_at },
        2 => OutreachPlan::Completed {
            sent_at,
            completed_at: (sent_at + Duration::minutes(rng.random_range(5..240))).min(now),
        },
        _ => OutreachPlan::Failed { at: sent_at },
    }
}

/// Reminder body used for seeded history.
pub fn demo_reminder_text(first_name: &str) -> String {
    format!(
        "Hi {first_name}, please complete your medical history form before your appointment: https://clinic.example/forms"
    )
}

// ── SeedDemoPatients ─────────────────────────────────────────────────────────

/// Seeding stopped at the first failing write. Patients created before it are kept.
#[derive(Debug, thiserror::Error)]
#[error("seeding stopped after {created} patients")]
pub struct SeedInterrupted {
    pub created: usize,
    #[source]
    pub source: OutreachServiceError,
}

pub struct SeedDemoPatientsUseCase<P: PatientRepository, O: OutreachRepository> {
    pub patients: P,
    pub outreach: O,
}

impl<P: PatientRepository, O: OutreachRepository> SeedDemoPatientsUseCase<P, O> {
    /// Persist the drafts for `user_id`. Returns the number of patients created.
    pub async fn execute(
        &self,
        user_id: Uuid,
        drafts: Vec<PatientDraft>,
        now: DateTime<Utc>,
    ) -> Result<usize, SeedInterrupted> {
        let mut created = 0;
        for draft in drafts {
            self.persist(user_id, draft, now)
                .await
                .map_err(|source| SeedInterrupted { created, source })?;
            created += 1;
        }
        Ok(created)
    }

    async fn persist(
        &self,
        user_id: Uuid,
        draft: PatientDraft,
        now: DateTime<Utc>,
    ) -> Result<(), OutreachServiceError> {
        let patient = Patient {
            id: Uuid::now_v7(),
            user_id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            appointment_at: draft.appointment_at,
            status: PatientStatus::Pending,
            last_sent_at: None,
            created_at: now,
            updated_at: now,
        };
        self.patients.create(&patient).await?;

        let text = demo_reminder_text(&patient.first_name);
        let message = match draft.outreach {
            OutreachPlan::None => None,
            OutreachPlan::Sent { at } => Some(SmsMessage::sent(text, at)),
            OutreachPlan::Completed {
                sent_at,
                completed_at,
            } => Some(SmsMessage {
                completed_at: Some(completed_at),
                ..SmsMessage::sent(text, sent_at)
            }),
            OutreachPlan::Failed { at } => Some(SmsMessage::failed(text, at)),
        };
        if let Some(message) = message {
            self.outreach.record_attempt(patient.id, &message).await?;
        }
        Ok(())
    }
}
