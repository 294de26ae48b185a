//! Saved workouts, stored by the backend as routines.

use uuid::Uuid;

use crate::client::ApiClient;
use crate::envelope::parse_direct;
use crate::error::ApiError;
use crate::executor::execute_api_call;
use crate::normalize::{messages, MessageMap};
use crate::types::{RoutineRequest, Workout, WorkoutInput};

pub(crate) const ROUTINES_PATH: &str = "/routines";
const NOT_FOUND: &str = "Rutina no encontrada";

#[derive(Debug, Clone)]
pub struct WorkoutService {
    client: ApiClient,
}

impl WorkoutService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_workouts(&self) -> Result<Vec<Workout>, ApiError> {
        let request = self.client.get(ROUTINES_PATH);
        let response = execute_api_call(|| self.client.send(request), &MessageMap::new()).await?;
        parse_direct(&response.body)
    }

    pub async fn get_workout(&self, id: Uuid) -> Result<Workout, ApiError> {
        let request = self.client.get(&format!("{ROUTINES_PATH}/{id}"));
        let response = execute_api_call(|| self.client.send(request), &messages([(404, NOT_FOUND)])).await?;
        parse_direct(&response.body)
    }

    pub async fn create_workout(&self, input: WorkoutInput) -> Result<Workout, ApiError> {
        let request = self.client.post(ROUTINES_PATH, &RoutineRequest { routine: input })?;
        let response = execute_api_call(|| self.client.send(request), &MessageMap::new()).await?;
        parse_direct(&response.body)
    }

    pub async fn update_workout(&self, id: Uuid, input: WorkoutInput) -> Result<Workout, ApiError> {
        let request = self
            .client
            .patch(&format!("{ROUTINES_PATH}/{id}"), &RoutineRequest { routine: input })?;
        let response = execute_api_call(|| self.client.send(request), &messages([(404, NOT_FOUND)])).await?;
        parse_direct(&response.body)
    }

    pub async fn delete_workout(&self, id: Uuid) -> Result<(), ApiError> {
        let request = self.client.delete(&format!("{ROUTINES_PATH}/{id}"));
        execute_api_call(|| self.client.send(request), &messages([(404, NOT_FOUND)])).await?;
        Ok(())
    }
}
