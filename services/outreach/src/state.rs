use axum::extract::FromRef;
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbDashboardRepository, DbOutreachRepository, DbPatientRepository, DbUserRepository,
};
use crate::infra::sms::SmsGateway;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub sms: SmsGateway,
    /// Defines the clinic's calendar day.
    pub timezone: Tz,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn patient_repo(&self) -> DbPatientRepository {
        DbPatientRepository {
            db: self.db.clone(),
        }
    }

    pub fn outreach_repo(&self) -> DbOutreachRepository {
        DbOutreachRepository {
            db: self.db.clone(),
        }
    }

    pub fn dashboard_repo(&self) -> DbDashboardRepository {
        DbDashboardRepository {
            db: self.db.clone(),
        }
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
