use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use clinic_auth_types::identity::IdentityHeaders;
use clinic_domain::status::PatientStatus;

use crate::domain::types::{MessageOutcome, SmsMessage};
use crate::error::OutreachServiceError;
use crate::state::AppState;
use crate::usecase::dispatch::RecordOutcomeUseCase;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SmsMessageResponse {
    pub id: Uuid,
    /// Status of this attempt on its own.
    pub status: PatientStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(serialize_with = "clinic_core::serde::opt_to_rfc3339_ms")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "clinic_core::serde::opt_to_rfc3339_ms")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "clinic_core::serde::opt_to_rfc3339_ms")]
    pub failed_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "clinic_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl SmsMessageResponse {
    /// Table row form, without the message body.
    pub fn summary(message: SmsMessage) -> Self {
        Self {
            content: None,
            ..Self::detail(message)
        }
    }

    pub fn detail(message: SmsMessage) -> Self {
        Self {
            id: message.id,
            status: message.status(),
            sent_at: message.sent_at,
            completed_at: message.completed_at,
            failed_at: message.failed_at,
            created_at: message.created_at,
            content: Some(message.content),
        }
    }
}

// ── POST /messages/{id}/completion ───────────────────────────────────────────

pub async fn complete_message(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<Json<SmsMessageResponse>, OutreachServiceError> {
    record_outcome(identity, state, &message_id, MessageOutcome::Completed).await
}

// ── POST /messages/{id}/failure ──────────────────────────────────────────────

pub async fn fail_message(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<Json<SmsMessageResponse>, OutreachServiceError> {
    record_outcome(identity, state, &message_id, MessageOutcome::Failed).await
}

async fn record_outcome(
    identity: IdentityHeaders,
    state: AppState,
    message_id: &str,
    outcome: MessageOutcome,
) -> Result<Json<SmsMessageResponse>, OutreachServiceError> {
    let message_id: Uuid = message_id
        .parse()
        .map_err(|_| OutreachServiceError::MessageNotFound)?;
    let uc = RecordOutcomeUseCase {
        repo: state.outreach_repo(),
    };
    let message = uc.execute(identity.user_id, message_id, outcome).await?;
    Ok(Json(SmsMessageResponse::detail(message)))
}
