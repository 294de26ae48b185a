//! Attempts at a challenge: start, complete, abandon, history.

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::envelope::{handle_api_response, parse_direct, Envelope};
use crate::error::ApiError;
use crate::executor::execute_api_call;
use crate::normalize::{messages, MessageMap};
use crate::types::{AttemptCompletion, ChallengeAttempt, CompleteAttempt};

const COMPLETE_ERROR: &str = "Error al completar el intento";

/// The completion body is an envelope with leaderboard details alongside.
#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(flatten)]
    envelope: Envelope<ChallengeAttempt>,
    #[serde(default)]
    leaderboard_position: Option<u32>,
    #[serde(default)]
    is_new_personal_best: bool,
}

#[derive(Debug, Clone)]
pub struct ChallengeAttemptService {
    client: ApiClient,
}

impl ChallengeAttemptService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn start_attempt(&self, challenge_id: Uuid) -> Result<ChallengeAttempt, ApiError> {
        let request = self
            .client
            .post(&format!("/api/v1/challenges/{challenge_id}/attempts"), &json!({}))?;
        let custom = messages([
            (404, "Desafío no encontrado"),
            (409, "Ya tienes un intento en curso para este desafío"),
        ]);
        let response = execute_api_call(|| self.client.send(request), &custom).await?;
        parse_direct(&response.body)
    }

    pub async fn complete_attempt(
        &self,
        challenge_id: Uuid,
        attempt_id: Uuid,
        payload: &CompleteAttempt,
    ) -> Result<AttemptCompletion, ApiError> {
        let request = self.client.put(
            &format!("/api/v1/challenges/{challenge_id}/attempts/{attempt_id}/complete"),
            payload,
        )?;
        let custom = messages([
            (404, "Intento no encontrado"),
            (409, "Este intento ya fue finalizado"),
        ]);
        let response = execute_api_call(|| self.client.send(request), &custom).await?;

        let body: CompletionBody = parse_direct(&response.body)?;
        let attempt = handle_api_response(body.envelope, Some(COMPLETE_ERROR))?;
        tracing::debug!(
            %attempt_id,
            position = ?body.leaderboard_position,
            personal_best = body.is_new_personal_best,
            "challenge attempt completed"
        );
        Ok(AttemptCompletion {
            attempt,
            leaderboard_position: body.leaderboard_position,
            is_new_personal_best: body.is_new_personal_best,
        })
    }

    pub async fn abandon_attempt(&self, challenge_id: Uuid, attempt_id: Uuid) -> Result<ChallengeAttempt, ApiError> {
        let request = self.client.put(
            &format!("/api/v1/challenges/{challenge_id}/attempts/{attempt_id}/abandon"),
            &json!({}),
        )?;
        let custom = messages([(404, "Intento no encontrado")]);
        let response = execute_api_call(|| self.client.send(request), &custom).await?;
        parse_direct(&response.body)
    }

    pub async fn get_challenge_attempts(&self, challenge_id: Uuid) -> Result<Vec<ChallengeAttempt>, ApiError> {
        let request = self.client.get(&format!("/api/v1/challenges/{challenge_id}/attempts"));
        let response = execute_api_call(|| self.client.send(request), &MessageMap::new()).await?;
        parse_direct(&response.body)
    }

    pub async fn get_my_attempts(&self) -> Result<Vec<ChallengeAttempt>, ApiError> {
        let request = self.client.get("/api/v1/my-attempts");
        let response = execute_api_call(|| self.client.send(request), &MessageMap::new()).await?;
        parse_direct(&response.body)
    }
}
