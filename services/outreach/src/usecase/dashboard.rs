use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::domain::repository::DashboardRepository;
use crate::domain::types::{DashboardStats, DayWindow};
use crate::error::OutreachServiceError;

pub struct GetDashboardStatsUseCase<D: DashboardRepository> {
    pub repo: D,
    pub timezone: Tz,
}

impl<D: DashboardRepository> GetDashboardStatsUseCase<D> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, OutreachServiceError> {
        let today = DayWindow::containing(self.timezone, now);
        self.repo.stats(user_id, today).await
    }
}
