//! Patient outreach status and the rule that derives it from message history.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outreach state of a patient, derived from the messages linked to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    Pending,
    Sent,
    Completed,
    Failed,
}

impl PatientStatus {
    pub const ALL: [PatientStatus; 4] = [Self::Pending, Self::Sent, Self::Completed, Self::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Sent => "Sent",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown patient status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for PatientStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Lifecycle timestamps of one outreach attempt.
pub trait OutreachAttempt {
    fn sent_at(&self) -> Option<DateTime<Utc>>;
    fn completed_at(&self) -> Option<DateTime<Utc>>;
    fn failed_at(&self) -> Option<DateTime<Utc>>;
}

/// Derive a patient's status from their full message history.
///
/// Evaluated in a fixed order: any completion wins, then any sent message still
/// awaiting completion, then any failure. An empty history is `Pending`.
pub fn derive_status<A: OutreachAttempt>(attempts: &[A]) -> PatientStatus {
    if attempts.iter().any(|a| a.completed_at().is_some()) {
        return PatientStatus::Completed;
    }
    if attempts
        .iter()
        .any(|a| a.sent_at().is_some() && a.completed_at().is_none())
    {
        return PatientStatus::Sent;
    }
    if attempts.iter().any(|a| a.failed_at().is_some()) {
        return PatientStatus::Failed;
    }
    PatientStatus::Pending
}

/// Status of a single attempt considered on its own.
pub fn attempt_status<A: OutreachAttempt>(attempt: &A) -> PatientStatus {
    derive_status(std::slice::from_ref(attempt))
}

/// Most recent dispatch time across the history (sent or failed), if any.
pub fn last_outreach_at<A: OutreachAttempt>(attempts: &[A]) -> Option<DateTime<Utc>> {
    attempts
        .iter()
        .filter_map(|a| a.sent_at().or(a.failed_at()))
        .max()
}
