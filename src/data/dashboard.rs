//! Dashboard and activity feed endpoints

use serde::Deserialize;

use super::client::{ApiClient, ApiError};
use super::{Activity, DashboardData};

/// `GET /activities` answers with either a bare list or a wrapped one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ActivitiesResponse {
    List(Vec<Activity>),
    Wrapped { activities: Vec<Activity> },
}

impl ApiClient {
    /// Fetches dashboard aggregates (`GET /dashboard`)
    pub async fn dashboard(&self) -> Result<DashboardData, ApiError> {
        self.send_json(self.get("/dashboard")).await
    }

    /// Fetches the full activity feed (`GET /activities`)
    pub async fn activities(&self) -> Result<Vec<Activity>, ApiError> {
        let response: ActivitiesResponse = self.send_json(self.get("/activities")).await?;
        Ok(match response {
            ActivitiesResponse::List(activities) => activities,
            ActivitiesResponse::Wrapped { activities } => activities,
        })
    }
}
