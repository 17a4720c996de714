use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use clinic_domain::status::PatientStatus;

use crate::domain::repository::{OutreachRepository, PatientRepository, SmsProvider};
use crate::domain::types::{MessageOutcome, SmsMessage};
use crate::error::OutreachServiceError;

// ── SendReminder ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SendReminderInput {
    pub patient_id: Uuid,
    /// Non-blank reminder body.
    pub message: String,
}

#[derive(Debug)]
pub struct SendReminderOutput {
    pub message: SmsMessage,
    pub status: PatientStatus,
}

pub struct SendReminderUseCase<P: PatientRepository, O: OutreachRepository, S: SmsProvider> {
    pub patients: P,
    pub outreach: O,
    pub sms: S,
}

impl<P, O, S> SendReminderUseCase<P, O, S>
where
    P: PatientRepository,
    O: OutreachRepository,
    S: SmsProvider,
{
    /// Every attempt that reaches the provider is recorded, whatever its
    /// outcome. A provider failure is returned as `Provider` after recording.
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: SendReminderInput,
    ) -> Result<SendReminderOutput, OutreachServiceError> {
        let SendReminderInput {
            patient_id,
            message: content,
        } = input;

        let patient = self
            .patients
            .find_by_id(user_id, patient_id)
            .await?
            .ok_or(OutreachServiceError::PatientNotFound)?;

        let outcome = self.sms.send(&patient.phone, &content).await;
        let now = Utc::now();
        match outcome {
            Ok(()) => {
                let message = SmsMessage::sent(content, now);
                let status = self.outreach.record_attempt(patient.id, &message).await?;
                info!(
                    %user_id,
                    patient_id = %patient.id,
                    message_id = %message.id,
                    "reminder sent"
                );
                Ok(SendReminderOutput { message, status })
            }
            Err(e) => {
                let message = SmsMessage::failed(content, now);
                self.outreach.record_attempt(patient.id, &message).await?;
                error!(
                    %user_id,
                    patient_id = %patient.id,
                    message_id = %message.id,
                    error = %e,
                    "reminder dispatch failed"
                );
                Err(OutreachServiceError::Provider(e.to_string()))
            }
        }
    }
}

// ── RecordOutcome ────────────────────────────────────────────────────────────

pub struct RecordOutcomeUseCase<O: OutreachRepository> {
    pub repo: O,
}

impl<O: OutreachRepository> RecordOutcomeUseCase<O> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        message_id: Uuid,
        outcome: MessageOutcome,
    ) -> Result<SmsMessage, OutreachServiceError> {
        self.repo
            .record_outcome(user_id, message_id, outcome, Utc::now())
            .await?
            .ok_or(OutreachServiceError::MessageNotFound)
    }
}
