//! Challenge catalogue and leaderboards.

use serde_json::json;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::envelope::{parse_direct, parse_enveloped};
use crate::error::ApiError;
use crate::executor::execute_with;
use crate::normalize::{BodyField, ErrorCatalog, MessageMap, ValidationStyle, CONNECTION_ERROR};
use crate::types::{Challenge, ChallengeLeaderboard, NewChallenge};

const CHALLENGES_PATH: &str = "/api/v1/challenges";

/// Challenge endpoints answer with their own wording and put the
/// human-readable text in `message` rather than `error`.
fn challenge_catalog() -> ErrorCatalog {
    ErrorCatalog::default()
        .with_status(401, "Debes iniciar sesión para ver los desafíos")
        .with_status(403, "No tienes permiso para modificar este desafío")
        .with_status(404, "Desafío no encontrado")
        .with_status(409, "Ya existe un desafío con ese nombre")
        .with_validation(ValidationStyle::ErrorList, "Los datos del desafío no son válidos")
        .with_body_fields(&[BodyField::Message, BodyField::Error])
}

#[derive(Debug, Clone)]
pub struct ChallengeService {
    client: ApiClient,
    catalog: ErrorCatalog,
}

impl ChallengeService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            catalog: challenge_catalog(),
        }
    }

    pub async fn get_challenges(&self) -> Result<Vec<Challenge>, ApiError> {
        let request = self.client.get(CHALLENGES_PATH);
        let response = execute_with(&self.catalog, || self.client.send(request), &MessageMap::new()).await?;
        parse_direct(&response.body)
    }

    pub async fn get_challenge(&self, id: Uuid) -> Result<Challenge, ApiError> {
        let request = self.client.get(&format!("{CHALLENGES_PATH}/{id}"));
        let response = execute_with(&self.catalog, || self.client.send(request), &MessageMap::new()).await?;
        parse_direct(&response.body)
    }

    pub async fn create_challenge(&self, input: &NewChallenge) -> Result<Challenge, ApiError> {
        let request = self.client.post(CHALLENGES_PATH, &json!({ "challenge": input }))?;
        let response = execute_with(&self.catalog, || self.client.send(request), &MessageMap::new()).await?;
        parse_direct(&response.body)
    }

    pub async fn delete_challenge(&self, id: Uuid) -> Result<(), ApiError> {
        let request = self.client.delete(&format!("{CHALLENGES_PATH}/{id}"));
        execute_with(&self.catalog, || self.client.send(request), &MessageMap::new()).await?;
        Ok(())
    }

    /// The leaderboard is the one challenge endpoint wrapped in an envelope.
    /// A failed envelope without a message reads "Error de conexión".
    pub async fn get_challenge_leaderboard(&self, id: Uuid) -> Result<Option<ChallengeLeaderboard>, ApiError> {
        let request = self.client.get(&format!("{CHALLENGES_PATH}/{id}/leaderboard"));
        let response = execute_with(&self.catalog, || self.client.send(request), &MessageMap::new()).await?;
        parse_enveloped(&response.body, CONNECTION_ERROR)
    }
}
