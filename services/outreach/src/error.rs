use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use clinic_domain::validation::ValidationErrors;

/// Outreach service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum OutreachServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("patient not found")]
    PatientNotFound,
    #[error("message not found")]
    MessageNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("validation failed")]
    Validation(#[from] ValidationErrors),
    #[error("sms provider error: {0}")]
    Provider(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl OutreachServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::PatientNotFound => "PATIENT_NOT_FOUND",
            Self::MessageNotFound => "MESSAGE_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::Validation(_) => "VALIDATION",
            Self::Provider(_) => "PROVIDER",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<validator::ValidationErrors> for OutreachServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.into())
    }
}

/// Unparsable or mistyped request bodies are reported under the `body` field.
impl From<JsonRejection> for OutreachServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationErrors::single("body", rejection.body_text()))
    }
}

impl IntoResponse for OutreachServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound | Self::PatientNotFound | Self::MessageNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Provider(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::Validation(ref errors) = self {
            body["errors"] = serde_json::to_value(errors).unwrap_or_default();
        }
        (status, axum::Json(body)).into_response()
    }
}

/// Failure reported by an SMS provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0}")]
    Transport(String),
    #[error("{message} (status {status})")]
    Rejected { status: u16, message: String },
}
