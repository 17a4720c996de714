use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use clinic_auth_types::identity::IdentityHeaders;

use crate::error::OutreachServiceError;
use crate::handlers::extract::ValidatedJson;
use crate::state::AppState;
use crate::usecase::seed::{DEFAULT_DEMO_PATIENTS, SeedDemoPatientsUseCase, generate_drafts};
use crate::usecase::user::{DeleteUserUseCase, OnboardUserUseCase, RegisterUserUseCase};

#[derive(Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[serde(default, deserialize_with = "clinic_core::serde::trimmed_opt")]
    #[validate(
        required(message = "is required"),
        email(message = "must be a valid email address")
    )]
    pub email: Option<String>,
    #[serde(default)]
    pub seed_demo: bool,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    #[serde(serialize_with = "clinic_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    pub seeded_patients: usize,
}

// ── POST /users/@me ──────────────────────────────────────────────────────────

pub async fn register_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), OutreachServiceError> {
    let email = body.email.unwrap_or_default();
    let now = Utc::now();
    let drafts = if body.seed_demo {
        // The thread-local RNG must not live across an await.
        let mut rng = rand::rng();
        generate_drafts(&mut rng, DEFAULT_DEMO_PATIENTS, now, state.timezone)
    } else {
        vec![]
    };

    let uc = OnboardUserUseCase {
        register: RegisterUserUseCase {
            repo: state.user_repo(),
        },
        seed: SeedDemoPatientsUseCase {
            patients: state.patient_repo(),
            outreach: state.outreach_repo(),
        },
    };
    let output = uc.execute(identity.user_id, &email, drafts, now).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: output.user.id,
            email: output.user.email,
            created_at: output.user.created_at,
            seeded_patients: output.seeded_patients,
        }),
    ))
}

// ── DELETE /users/@me ────────────────────────────────────────────────────────

pub async fn delete_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<StatusCode, OutreachServiceError> {
    let uc = DeleteUserUseCase {
        repo: state.user_repo(),
    };
    uc.execute(identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
