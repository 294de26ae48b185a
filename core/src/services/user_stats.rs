//! Activity totals for the signed-in user.

use crate::client::ApiClient;
use crate::envelope::parse_direct;
use crate::error::ApiError;
use crate::executor::execute_api_call;
use crate::normalize::messages;
use crate::types::UserStats;

#[derive(Debug, Clone)]
pub struct UserStatsService {
    client: ApiClient,
}

impl UserStatsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Totals and streaks for the signed-in user.
    pub async fn get_user_stats(&self) -> Result<UserStats, ApiError> {
        let request = self.client.get("/api/v1/users/me/stats");
        let custom = messages([(401, "Inicia sesión para ver tus estadísticas")]);
        let response = execute_api_call(|| self.client.send(request), &custom).await?;
        parse_direct(&response.body)
    }
}
