use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use clinic_auth_types::identity::IdentityHeaders;
use clinic_domain::pagination::Page;
use clinic_domain::status::PatientStatus;
use clinic_domain::validation::{ValidationErrors, international_phone, rfc3339_timestamp};

use crate::domain::types::{PatientWithHistory, local_date_and_time};
use crate::error::OutreachServiceError;
use crate::handlers::extract::ValidatedJson;
use crate::handlers::message::SmsMessageResponse;
use crate::state::AppState;
use crate::usecase::patient::{
    CreatePatientInput, CreatePatientUseCase, GetPatientUseCase, ListPatientsInput,
    ListPatientsUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PatientResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub status: PatientStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_label: Option<&'static str>,
    #[serde(serialize_with = "clinic_core::serde::opt_to_rfc3339_ms")]
    pub last_sent_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "clinic_core::serde::opt_to_rfc3339_ms")]
    pub appointment_at: Option<DateTime<Utc>>,
    /// `YYYY-MM-DD` in the clinic timezone.
    pub appointment_date: Option<String>,
    /// `HH:MM` in the clinic timezone.
    pub appointment_time: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "clinic_core::serde::opt_to_rfc3339_ms"
    )]
    pub created_at: Option<DateTime<Utc>>,
    pub sms_messages: Vec<SmsMessageResponse>,
}

impl PatientResponse {
    /// Table row.
    pub fn summary(row: PatientWithHistory, tz: Tz) -> Self {
        let mut response = Self::base(&row, tz);
        response.sms_messages = row
            .messages
            .into_iter()
            .map(SmsMessageResponse::summary)
            .collect();
        response
    }

    /// Detail panel: adds the label, creation time and message bodies.
    pub fn detail(row: PatientWithHistory, tz: Tz) -> Self {
        let mut response = Self::base(&row, tz);
        response.status_label = Some(row.patient.status.label());
        response.created_at = Some(row.patient.created_at);
        response.sms_messages = row
            .messages
            .into_iter()
            .map(SmsMessageResponse::detail)
            .collect();
        response
    }

    fn base(row: &PatientWithHistory, tz: Tz) -> Self {
        let patient = &row.patient;
        let (appointment_date, appointment_time) = patient
            .appointment_at
            .map(|at| local_date_and_time(tz, at))
            .unzip();
        Self {
            id: patient.id,
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            status: patient.status,
            status_label: None,
            last_sent_at: patient.last_sent_at,
            appointment_at: patient.appointment_at,
            appointment_date,
            appointment_time,
            created_at: None,
            sms_messages: vec![],
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct PatientListQuery {
    pub today_only: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortDir")]
    pub sort_dir: Option<String>,
    pub page: Option<String>,
}

/// Page numbers below 1 and unparsable values fall back to the first page.
fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .map(|p| u32::try_from(p.max(1)).unwrap_or(u32::MAX))
        .unwrap_or(1)
}

// ── GET /patients ────────────────────────────────────────────────────────────

pub async fn list_patients(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<PatientResponse>>, OutreachServiceError> {
    let query: PatientListQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| ValidationErrors::single("query", "is malformed"))?
        .unwrap_or_default();

    let uc = ListPatientsUseCase {
        repo: state.patient_repo(),
        timezone: state.timezone,
    };
    let page = uc
        .execute(
            identity.user_id,
            ListPatientsInput {
                page: Some(parse_page(query.page.as_deref())),
                today_only: query.today_only,
                status: query.status,
                search: query.search,
                sort_by: query.sort_by,
                sort_dir: query.sort_dir,
            },
            Utc::now(),
        )
        .await?;
    Ok(Json(page.map(|row| PatientResponse::summary(row, state.timezone))))
}

// ── GET /patients/{id} ───────────────────────────────────────────────────────

pub async fn get_patient(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientResponse>, OutreachServiceError> {
    let patient_id: Uuid = patient_id
        .parse()
        .map_err(|_| OutreachServiceError::PatientNotFound)?;
    let uc = GetPatientUseCase {
        repo: state.patient_repo(),
    };
    let row = uc.execute(identity.user_id, patient_id).await?;
    Ok(Json(PatientResponse::detail(row, state.timezone)))
}

// ── POST /patients ───────────────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreatePatientRequest {
    #[serde(default, deserialize_with = "clinic_core::serde::trimmed_opt")]
    #[validate(
        required(message = "is required"),
        length(min = 1, max = 255, message = "must be 1 to 255 characters")
    )]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "clinic_core::serde::trimmed_opt")]
    #[validate(
        required(message = "is required"),
        length(min = 1, max = 255, message = "must be 1 to 255 characters")
    )]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "clinic_core::serde::trimmed_opt")]
    #[validate(
        required(message = "is required"),
        custom(function = "international_phone")
    )]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "clinic_core::serde::trimmed_opt")]
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    /// RFC 3339.
    #[serde(default, deserialize_with = "clinic_core::serde::trimmed_opt")]
    #[validate(custom(function = "rfc3339_timestamp"))]
    pub appointment_at: Option<String>,
}

/// Runs after [`Validate::validate`] succeeded.
impl TryFrom<CreatePatientRequest> for CreatePatientInput {
    type Error = ValidationErrors;

    fn try_from(body: CreatePatientRequest) -> Result<Self, Self::Error> {
        let required = |field: &str, value: Option<String>| {
            value.ok_or_else(|| ValidationErrors::single(field, "is required"))
        };
        let appointment_at = body
            .appointment_at
            .as_deref()
            .map(DateTime::parse_from_rfc3339)
            .transpose()
            .map_err(|_| {
                ValidationErrors::single("appointment_at", "must be an RFC 3339 timestamp")
            })?
            .map(|at| at.with_timezone(&Utc));
        Ok(Self {
            first_name: required("first_name", body.first_name)?,
            last_name: required("last_name", body.last_name)?,
            phone: required("phone", body.phone)?,
            email: body.email,
            appointment_at,
        })
    }
}

pub async fn create_patient(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreatePatientRequest>,
) -> Result<(StatusCode, Json<PatientResponse>), OutreachServiceError> {
    let uc = CreatePatientUseCase {
        users: state.user_repo(),
        patients: state.patient_repo(),
    };
    let patient = uc.execute(identity.user_id, body.try_into()?).await?;
    let row = PatientWithHistory {
        patient,
        messages: vec![],
    };
    Ok((
        StatusCode::CREATED,
        Json(PatientResponse::detail(row, state.timezone)),
    ))
}
