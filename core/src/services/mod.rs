//! Domain services.
//!
//! Each service holds a clone of the shared `ApiClient`, builds its request,
//! runs it through the executor with its error mapping, and decodes the
//! body with the contract its endpoint uses.

pub mod ai_routines;
pub mod challenge_attempts;
pub mod challenges;
pub mod exercises;
pub mod user_stats;
pub mod workouts;

pub use ai_routines::AiRoutineService;
pub use challenge_attempts::ChallengeAttemptService;
pub use challenges::ChallengeService;
pub use exercises::ExerciseService;
pub use user_stats::UserStatsService;
pub use workouts::WorkoutService;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::client::ApiClient;
    use crate::config::ClientConfig;
    use crate::testing::FakeHttp;

    pub(crate) const BASE_URL: &str = "http://api.test";

    pub(crate) fn client_with(fake: FakeHttp) -> (ApiClient, Arc<FakeHttp>) {
        let fake = Arc::new(fake);
        let client = ApiClient::new(ClientConfig::new(BASE_URL).with_token("token"), fake.clone());
        (client, fake)
    }
}
