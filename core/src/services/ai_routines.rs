//! AI routine generation and saving of the generated routines.
//!
//! # Design
//! Generation has its own error wording, including a per-field breakdown of
//! 422 `details`, and lets any failure it does not recognize through
//! unchanged (`ApiError::Raw`). Saving fans out one request per routine and
//! reports each outcome instead of failing the batch.

use futures::future::join_all;
use serde::Deserialize;
use serde_json::Value;

use crate::client::ApiClient;
use crate::envelope::{parse_direct, parse_enveloped};
use crate::error::{ApiError, RawApiError};
use crate::executor::execute_with;
use crate::normalize::{ErrorCatalog, MessageMap, Unmapped, ValidationStyle, INVALID_DATA};
use crate::services::workouts::ROUTINES_PATH;
use crate::types::{
    AiRoutine, RoutineExerciseInput, RoutineGenerationRequest, RoutineRequest, RoutineSaveResult,
    SaveRoutinesSummary, Workout, WorkoutInput,
};

pub const GENERATE_PATH: &str = "/ai/workout_routines";
pub const AI_SOURCE: &str = "ai_generated";

const GENERATION_FAILED: &str = "No se pudieron generar las rutinas";
const INVALID_RESPONSE: &str = "Respuesta inválida del servidor de IA";

fn generation_catalog() -> ErrorCatalog {
    ErrorCatalog::default()
        .with_status(400, "Solicitud inválida para generar rutinas")
        .with_status(500, "Error interno del servidor de IA")
        .with_status(503, "El servicio de IA no está disponible en este momento")
        .with_validation(ValidationStyle::FieldDetails, INVALID_DATA)
        .with_unmapped(Unmapped::PassThrough)
}

#[derive(Debug, Deserialize)]
struct GeneratedRoutines {
    #[serde(default)]
    routines: Option<Vec<AiRoutine>>,
}

#[derive(Debug, Clone)]
pub struct AiRoutineService {
    client: ApiClient,
    catalog: ErrorCatalog,
}

impl AiRoutineService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            catalog: generation_catalog(),
        }
    }

    pub async fn generate_routines(&self, input: &RoutineGenerationRequest) -> Result<Vec<AiRoutine>, ApiError> {
        let request = self.client.post(GENERATE_PATH, input)?;
        let response = execute_with(&self.catalog, || self.client.send(request), &MessageMap::new()).await?;
        let routines = parse_enveloped::<GeneratedRoutines>(&response.body, GENERATION_FAILED)?
            .and_then(|data| data.routines)
            .ok_or_else(|| ApiError::normalized(Some(response.status), INVALID_RESPONSE))?;
        tracing::info!(count = routines.len(), "generated AI routines");
        Ok(routines)
    }

    /// Save every routine concurrently. `results` keeps the input order.
    pub async fn save_generated_routines(&self, routines: &[AiRoutine]) -> SaveRoutinesSummary {
        let results = join_all(routines.iter().map(|routine| self.save_routine(routine))).await;
        let success = results.iter().filter(|r| r.success).count();
        let failed = results.len() - success;
        if failed > 0 {
            tracing::warn!(success, failed, "some generated routines were not saved");
        }
        SaveRoutinesSummary {
            success,
            failed,
            results,
        }
    }

    async fn save_routine(&self, routine: &AiRoutine) -> RoutineSaveResult {
        let body = RoutineRequest {
            routine: routine_input(routine),
        };
        let request = match self.client.post(ROUTINES_PATH, &body) {
            Ok(request) => request,
            Err(err) => return failure(Value::String(err.to_string())),
        };
        match self.client.send(request).await {
            // The server accepted the routine; a body that is not a full
            // `Workout` only leaves `data` empty.
            Ok(response) => RoutineSaveResult {
                success: true,
                data: parse_direct::<Option<Workout>>(&response.body).ok().flatten(),
                error: None,
            },
            Err(raw) => failure(failure_body(raw)),
        }
    }
}

/// Save payload for a generated routine. `rest_time` defaults to 0 and
/// `order` to the 1-based position; an explicit `order` of 0 counts as unset.
pub fn routine_input(routine: &AiRoutine) -> WorkoutInput {
    let routine_exercises_attributes = routine
        .exercises
        .iter()
        .enumerate()
        .map(|(index, exercise)| RoutineExerciseInput {
            exercise_id: exercise.exercise_id,
            sets: exercise.sets,
            reps: exercise.reps,
            rest_time: exercise.rest_time.unwrap_or(0),
            order: exercise
                .order
                .filter(|&order| order != 0)
                .unwrap_or_else(|| u32::try_from(index + 1).unwrap_or(u32::MAX)),
        })
        .collect();

    WorkoutInput {
        name: Some(routine.name.clone()),
        description: routine.description.clone(),
        difficulty: routine.difficulty.clone(),
        duration: routine.duration,
        source: Some(AI_SOURCE.to_string()),
        routine_exercises_attributes,
    }
}

fn failure(error: Value) -> RoutineSaveResult {
    RoutineSaveResult {
        success: false,
        data: None,
        error: Some(error),
    }
}

/// The server's error body, or the low-level message when there is none.
fn failure_body(raw: RawApiError) -> Value {
    match raw.response {
        Some(response) if !response.data.is_null() => response.data,
        _ => Value::String(raw.message.unwrap_or_default()),
    }
}
