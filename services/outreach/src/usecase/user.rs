use chrono::{DateTime, Utc};
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::repository::{OutreachRepository, PatientRepository, UserRepository};
use crate::domain::types::ClinicUser;
use crate::error::OutreachServiceError;
use crate::usecase::seed::{PatientDraft, SeedDemoPatientsUseCase};

// ── RegisterUser ─────────────────────────────────────────────────────────────

pub struct RegisterUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> RegisterUserUseCase<R> {
    /// Register the caller as an owning user. Both the id and the email must be unused.
    ///
    /// `email` must already be validated; it is stored trimmed and lowercased.
    pub async fn execute(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<ClinicUser, OutreachServiceError> {
        let email = email.trim().to_lowercase();

        if self.repo.find_by_id(user_id).await?.is_some()
            || self.repo.find_by_email(&email).await?.is_some()
        {
            return Err(OutreachServiceError::UserAlreadyExists);
        }

        let user = ClinicUser {
            id: user_id,
            email,
            created_at: Utc::now(),
        };
        self.repo.create(&user).await?;
        Ok(user)
    }
}

// ── OnboardUser ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct OnboardUserOutput {
    pub user: ClinicUser,
    pub seeded_patients: usize,
}

/// Registration followed by optional demo seeding.
///
/// The user stays registered when seeding fails partway. The failure is logged
/// and the output reports how many patients were seeded.
pub struct OnboardUserUseCase<U: UserRepository, P: PatientRepository, O: OutreachRepository> {
    pub register: RegisterUserUseCase<U>,
    pub seed: SeedDemoPatientsUseCase<P, O>,
}

impl<U, P, O> OnboardUserUseCase<U, P, O>
where
    U: UserRepository,
    P: PatientRepository,
    O: OutreachRepository,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        email: &str,
        drafts: Vec<PatientDraft>,
        now: DateTime<Utc>,
    ) -> Result<OnboardUserOutput, OutreachServiceError> {
        let user = self.register.execute(user_id, email).await?;
        if drafts.is_empty() {
            return Ok(OnboardUserOutput {
                user,
                seeded_patients: 0,
            });
        }

        let seeded_patients = match self.seed.execute(user.id, drafts, now).await {
            Ok(created) => {
                info!(user_id = %user.id, seeded_patients = created, "seeded demo patients");
                created
            }
            Err(e) => {
                error!(
                    user_id = %user.id,
                    seeded_patients = e.created,
                    error = %e.source,
                    "demo seeding failed; user kept"
                );
                e.created
            }
        };
        Ok(OnboardUserOutput {
            user,
            seeded_patients,
        })
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> DeleteUserUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<(), OutreachServiceError> {
        if self.repo.delete(user_id).await? {
            Ok(())
        } else {
            Err(OutreachServiceError::UserNotFound)
        }
    }
}
