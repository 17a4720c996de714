use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use clinic_auth_types::identity::IdentityHeaders;
use clinic_domain::status::PatientStatus;
use clinic_domain::validation::ValidationErrors;

use crate::error::OutreachServiceError;
use crate::handlers::extract::ValidatedJson;
use crate::state::AppState;
use crate::usecase::dispatch::{SendReminderInput, SendReminderUseCase};

#[derive(Deserialize, Validate)]
pub struct SendSmsRequest {
    #[serde(default, deserialize_with = "clinic_core::serde::trimmed_opt")]
    #[validate(required(message = "is required"), custom(function = "patient_uuid"))]
    pub patient_id: Option<String>,
    #[serde(default, deserialize_with = "clinic_core::serde::trimmed_opt")]
    #[validate(required(message = "is required"))]
    pub message: Option<String>,
}

fn patient_uuid(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Uuid>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("uuid").with_message("must be a valid id".into()))
}

impl TryFrom<SendSmsRequest> for SendReminderInput {
    type Error = ValidationErrors;

    fn try_from(body: SendSmsRequest) -> Result<Self, Self::Error> {
        let patient_id = body
            .patient_id
            .as_deref()
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| ValidationErrors::single("patient_id", "must be a valid id"))?;
        let message = body
            .message
            .ok_or_else(|| ValidationErrors::single("message", "is required"))?;
        Ok(Self {
            patient_id,
            message,
        })
    }
}

#[derive(Serialize)]
pub struct SendSmsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PatientStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ── POST /sms/send ───────────────────────────────────────────────────────────

pub async fn send_sms(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SendSmsRequest>,
) -> Result<Response, OutreachServiceError> {
    let uc = SendReminderUseCase {
        patients: state.patient_repo(),
        outreach: state.outreach_repo(),
        sms: state.sms.clone(),
    };
    let result = uc.execute(identity.user_id, body.try_into()?).await;

    match result {
        Ok(output) => Ok(Json(SendSmsResponse {
            success: true,
            message_id: Some(output.message.id),
            status: Some(output.status),
            error: None,
        })
        .into_response()),
        // The failed attempt is already recorded; report it in the send envelope.
        Err(OutreachServiceError::Provider(error)) => Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SendSmsResponse {
                success: false,
                message_id: None,
                status: None,
                error: Some(error),
            }),
        )
            .into_response()),
        Err(e) => Err(e),
    }
}
