use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;

use clinic_auth_types::identity::IdentityHeaders;

use crate::domain::types::DashboardStats;
use crate::error::OutreachServiceError;
use crate::state::AppState;
use crate::usecase::dashboard::GetDashboardStatsUseCase;

#[derive(Serialize)]
pub struct DashboardStatsResponse {
    pub total_patients: u64,
    pub todays_appointments: u64,
    pub forms_sent_today: u64,
    pub pending_forms: u64,
}

impl From<DashboardStats> for DashboardStatsResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_patients: stats.total_patients,
            todays_appointments: stats.todays_appointments,
            forms_sent_today: stats.forms_sent_today,
            pending_forms: stats.pending_forms,
        }
    }
}

// ── GET /dashboard/stats ─────────────────────────────────────────────────────

pub async fn get_dashboard_stats(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<DashboardStatsResponse>, OutreachServiceError> {
    let uc = GetDashboardStatsUseCase {
        repo: state.dashboard_repo(),
        timezone: state.timezone,
    };
    let stats = uc.execute(identity.user_id, Utc::now()).await?;
    Ok(Json(stats.into()))
}
