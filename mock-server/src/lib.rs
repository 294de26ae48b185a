//! In-memory stand-in for the fitness backend.
//!
//! Serves the same REST surface the client core talks to, with the error
//! bodies the real backend produces: `{"error": ...}` for 401/404/409,
//! `{"errors": [...]}` for model validation and `{"details": {...}}` for the
//! AI generator. Every route requires a bearer token.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// The single user every request is attributed to.
pub const DEMO_USER_ID: Uuid = Uuid::from_u128(0x5eed);
pub const DEMO_USER_NAME: &str = "Demo";

pub const VALID_GOALS: &[&str] = &["lose_weight", "gain_muscle", "improve_endurance", "maintain"];

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChallengeExercise {
    pub exercise_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reps: Option<u32>,
    pub order: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub time_limit_seconds: Option<u32>,
    pub exercises: Vec<ChallengeExercise>,
}

#[derive(Deserialize)]
pub struct ChallengeParams {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub time_limit_seconds: Option<u32>,
    #[serde(default)]
    pub exercises: Vec<ChallengeExercise>,
}

#[derive(Deserialize)]
pub struct CreateChallenge {
    pub challenge: ChallengeParams,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Abandoned,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub challenge_id: Uuid,
    pub status: AttemptStatus,
    pub completion_time_seconds: Option<u32>,
}

#[derive(Deserialize)]
pub struct CompleteAttempt {
    pub completion_time_seconds: u32,
    #[serde(default)]
    pub exercise_times: Vec<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub muscle_group: Option<String>,
    pub equipment: Option<String>,
    pub difficulty: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Default, Deserialize)]
pub struct ExerciseParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub muscle_group: Option<String>,
    pub equipment: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Deserialize)]
pub struct ExerciseBody {
    pub exercise: ExerciseParams,
}

#[derive(Deserialize)]
pub struct VideoUrlBody {
    pub video_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutineExercise {
    pub exercise_id: Uuid,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    #[serde(default)]
    pub rest_time: u32,
    #[serde(default)]
    pub order: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Routine {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub duration: Option<u32>,
    pub source: Option<String>,
    pub routine_exercises: Vec<RoutineExercise>,
}

#[derive(Default, Deserialize)]
pub struct RoutineParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub duration: Option<u32>,
    pub source: Option<String>,
    pub routine_exercises_attributes: Option<Vec<RoutineExercise>>,
}

#[derive(Deserialize)]
pub struct RoutineBody {
    pub routine: RoutineParams,
}

#[derive(Default, Deserialize)]
pub struct GenerateRoutines {
    #[serde(default)]
    pub profile: HashMap<String, Value>,
    #[serde(default)]
    pub preferences: HashMap<String, Value>,
}

// ---------------------------------------------------------------------------
// State and errors
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Store {
    pub challenges: HashMap<Uuid, Challenge>,
    pub attempts: Vec<Attempt>,
    pub exercises: HashMap<Uuid, Exercise>,
    pub routines: HashMap<Uuid, Routine>,
}

pub type Db = Arc<RwLock<Store>>;

/// An error response with the backend's JSON body.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    body: Value,
}

impl Failure {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: json!({"error": "Record not found"}),
        }
    }

    fn conflict(message: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            body: json!({"error": message}),
        }
    }

    fn invalid(errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: json!({"errors": errors}),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/v1/challenges", get(list_challenges).post(create_challenge))
        .route("/api/v1/challenges/{id}", get(get_challenge).delete(delete_challenge))
        .route("/api/v1/challenges/{id}/leaderboard", get(leaderboard))
        .route("/api/v1/challenges/{id}/attempts", get(list_attempts).post(start_attempt))
        .route("/api/v1/challenges/{id}/attempts/{attempt_id}/complete", put(complete_attempt))
        .route("/api/v1/challenges/{id}/attempts/{attempt_id}/abandon", put(abandon_attempt))
        .route("/api/v1/my-attempts", get(my_attempts))
        .route("/api/v1/users/me/stats", get(user_stats))
        .route("/exercises", get(list_exercises).post(create_exercise))
        .route(
            "/exercises/{id}",
            get(get_exercise).patch(update_exercise).delete(delete_exercise),
        )
        .route("/exercises/{id}/video_url", put(update_video_url))
        .route("/routines", get(list_routines).post(create_routine))
        .route(
            "/routines/{id}",
            get(get_routine).patch(update_routine).delete(delete_routine),
        )
        .route("/ai/workout_routines", post(generate_routines))
        .layer(middleware::from_fn(require_token))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_token(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer ") && v.len() > "Bearer ".len());
    if !authorized {
        return Failure {
            status: StatusCode::UNAUTHORIZED,
            body: json!({"error": "Not authenticated"}),
        }
        .into_response();
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Challenges
// ---------------------------------------------------------------------------

async fn list_challenges(State(db): State<Db>) -> Json<Vec<Challenge>> {
    Json(db.read().await.challenges.values().cloned().collect())
}

async fn get_challenge(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Challenge>, Failure> {
    db.read().await.challenges.get(&id).cloned().map(Json).ok_or_else(Failure::not_found)
}

async fn create_challenge(
    State(db): State<Db>,
    Json(input): Json<CreateChallenge>,
) -> Result<(StatusCode, Json<Challenge>), Failure> {
    let params = input.challenge;
    if params.name.trim().is_empty() {
        return Err(Failure::invalid(vec!["Name can't be blank".to_string()]));
    }
    let mut store = db.write().await;
    if store.challenges.values().any(|c| c.name == params.name) {
        return Err(Failure::conflict("Name has already been taken"));
    }
    let challenge = Challenge {
        id: Uuid::new_v4(),
        name: params.name,
        description: params.description,
        difficulty: params.difficulty,
        time_limit_seconds: params.time_limit_seconds,
        exercises: params.exercises,
    };
    store.challenges.insert(challenge.id, challenge.clone());
    tracing::info!(id = %challenge.id, "challenge created");
    Ok((StatusCode::CREATED, Json(challenge)))
}

async fn delete_challenge(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    store.challenges.remove(&id).ok_or_else(Failure::not_found)?;
    store.attempts.retain(|a| a.challenge_id != id);
    Ok(StatusCode::NO_CONTENT)
}

/// Completed attempts of a challenge, fastest first.
fn ranking(store: &Store, challenge_id: Uuid) -> Vec<&Attempt> {
    let mut done: Vec<&Attempt> = store
        .attempts
        .iter()
        .filter(|a| a.challenge_id == challenge_id && a.status == AttemptStatus::Completed)
        .collect();
    done.sort_by_key(|a| a.completion_time_seconds.unwrap_or(u32::MAX));
    done
}

async fn leaderboard(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Value>, Failure> {
    let store = db.read().await;
    if !store.challenges.contains_key(&id) {
        return Err(Failure::not_found());
    }
    let entries: Vec<Value> = ranking(&store, id)
        .iter()
        .enumerate()
        .map(|(i, a)| {
            json!({
                "position": i + 1,
                "user_id": DEMO_USER_ID,
                "user_name": DEMO_USER_NAME,
                "completion_time_seconds": a.completion_time_seconds,
            })
        })
        .collect();
    let user_position = if entries.is_empty() { None } else { Some(1) };
    Ok(Json(json!({
        "success": true,
        "data": {"challenge_id": id, "entries": entries, "user_position": user_position}
    })))
}

// ---------------------------------------------------------------------------
// Attempts
// ---------------------------------------------------------------------------

async fn start_attempt(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Attempt>), Failure> {
    let mut store = db.write().await;
    if !store.challenges.contains_key(&id) {
        return Err(Failure::not_found());
    }
    if store
        .attempts
        .iter()
        .any(|a| a.challenge_id == id && a.status == AttemptStatus::InProgress)
    {
        return Err(Failure::conflict("An attempt is already in progress"));
    }
    let attempt = Attempt {
        id: Uuid::new_v4(),
        challenge_id: id,
        status: AttemptStatus::InProgress,
        completion_time_seconds: None,
    };
    store.attempts.push(attempt.clone());
    Ok((StatusCode::CREATED, Json(attempt)))
}

fn find_attempt(store: &mut Store, challenge_id: Uuid, attempt_id: Uuid) -> Result<&mut Attempt, Failure> {
    store
        .attempts
        .iter_mut()
        .find(|a| a.id == attempt_id && a.challenge_id == challenge_id)
        .ok_or_else(Failure::not_found)
}

async fn complete_attempt(
    State(db): State<Db>,
    Path((id, attempt_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<CompleteAttempt>,
) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let previous_best = ranking(&store, id).first().and_then(|a| a.completion_time_seconds);

    let attempt = find_attempt(&mut store, id, attempt_id)?;
    if attempt.status != AttemptStatus::InProgress {
        return Err(Failure::conflict("Attempt is not in progress"));
    }
    attempt.status = AttemptStatus::Completed;
    attempt.completion_time_seconds = Some(input.completion_time_seconds);
    let attempt = attempt.clone();
    tracing::info!(%attempt_id, splits = input.exercise_times.len(), "attempt completed");

    let position = ranking(&store, id)
        .iter()
        .position(|a| a.id == attempt_id)
        .map(|p| p + 1);
    let is_new_personal_best = previous_best.is_none_or(|best| input.completion_time_seconds < best);
    Ok(Json(json!({
        "success": true,
        "data": attempt,
        "leaderboard_position": position,
        "is_new_personal_best": is_new_personal_best,
    })))
}

async fn abandon_attempt(
    State(db): State<Db>,
    Path((id, attempt_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Attempt>, Failure> {
    let mut store = db.write().await;
    let attempt = find_attempt(&mut store, id, attempt_id)?;
    if attempt.status != AttemptStatus::InProgress {
        return Err(Failure::conflict("Attempt is not in progress"));
    }
    attempt.status = AttemptStatus::Abandoned;
    Ok(Json(attempt.clone()))
}

async fn list_attempts(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Vec<Attempt>>, Failure> {
    let store = db.read().await;
    if !store.challenges.contains_key(&id) {
        return Err(Failure::not_found());
    }
    Ok(Json(store.attempts.iter().filter(|a| a.challenge_id == id).cloned().collect()))
}

async fn my_attempts(State(db): State<Db>) -> Json<Vec<Attempt>> {
    Json(db.read().await.attempts.clone())
}

async fn user_stats(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let completed = store
        .attempts
        .iter()
        .filter(|a| a.status == AttemptStatus::Completed)
        .count();
    let minutes: u32 = store.routines.values().filter_map(|r| r.duration).sum();
    Json(json!({
        "total_workouts": store.routines.len(),
        "total_exercises": store.exercises.len(),
        "total_minutes": minutes,
        "challenges_completed": completed,
        "current_streak_days": 0,
        "best_streak_days": 0,
    }))
}

// ---------------------------------------------------------------------------
// Exercises
// ---------------------------------------------------------------------------

async fn list_exercises(State(db): State<Db>) -> Json<Vec<Exercise>> {
    Json(db.read().await.exercises.values().cloned().collect())
}

async fn get_exercise(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Exercise>, Failure> {
    db.read().await.exercises.get(&id).cloned().map(Json).ok_or_else(Failure::not_found)
}

async fn create_exercise(
    State(db): State<Db>,
    Json(input): Json<ExerciseBody>,
) -> Result<(StatusCode, Json<Exercise>), Failure> {
    let params = input.exercise;
    let name = params.name.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(Failure::invalid(vec!["Name can't be blank".to_string()]));
    }
    let exercise = Exercise {
        id: Uuid::new_v4(),
        name,
        description: params.description,
        muscle_group: params.muscle_group,
        equipment: params.equipment,
        difficulty: params.difficulty,
        video_url: None,
    };
    db.write().await.exercises.insert(exercise.id, exercise.clone());
    Ok((StatusCode::CREATED, Json(exercise)))
}

async fn update_exercise(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<ExerciseBody>,
) -> Result<Json<Exercise>, Failure> {
    let mut store = db.write().await;
    let exercise = store.exercises.get_mut(&id).ok_or_else(Failure::not_found)?;
    let params = input.exercise;
    if let Some(name) = params.name {
        if name.trim().is_empty() {
            return Err(Failure::invalid(vec!["Name can't be blank".to_string()]));
        }
        exercise.name = name;
    }
    if params.description.is_some() {
        exercise.description = params.description;
    }
    if params.muscle_group.is_some() {
        exercise.muscle_group = params.muscle_group;
    }
    if params.equipment.is_some() {
        exercise.equipment = params.equipment;
    }
    if params.difficulty.is_some() {
        exercise.difficulty = params.difficulty;
    }
    Ok(Json(exercise.clone()))
}

async fn update_video_url(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<VideoUrlBody>,
) -> Result<Json<Exercise>, Failure> {
    let mut store = db.write().await;
    let exercise = store.exercises.get_mut(&id).ok_or_else(Failure::not_found)?;
    if !(input.video_url.starts_with("http://") || input.video_url.starts_with("https://")) {
        return Err(Failure::invalid(vec!["Video url is invalid".to_string()]));
    }
    exercise.video_url = Some(input.video_url);
    Ok(Json(exercise.clone()))
}

async fn delete_exercise(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    if !store.exercises.contains_key(&id) {
        return Err(Failure::not_found());
    }
    let in_use = store
        .routines
        .values()
        .any(|r| r.routine_exercises.iter().any(|e| e.exercise_id == id));
    if in_use {
        return Err(Failure::conflict("Exercise is used by a routine"));
    }
    store.exercises.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Routines
// ---------------------------------------------------------------------------

async fn list_routines(State(db): State<Db>) -> Json<Vec<Routine>> {
    Json(db.read().await.routines.values().cloned().collect())
}

async fn get_routine(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Routine>, Failure> {
    db.read().await.routines.get(&id).cloned().map(Json).ok_or_else(Failure::not_found)
}

fn validate_name(store: &Store, name: &str, except: Option<Uuid>) -> Result<(), Failure> {
    if name.trim().is_empty() {
        return Err(Failure::invalid(vec!["Name can't be blank".to_string()]));
    }
    let taken = store
        .routines
        .values()
        .any(|r| r.name == name && Some(r.id) != except);
    if taken {
        return Err(Failure::invalid(vec!["Name has already been taken".to_string()]));
    }
    Ok(())
}

async fn create_routine(
    State(db): State<Db>,
    Json(input): Json<RoutineBody>,
) -> Result<(StatusCode, Json<Routine>), Failure> {
    let params = input.routine;
    let name = params.name.unwrap_or_default();
    let mut store = db.write().await;
    validate_name(&store, &name, None)?;
    let routine = Routine {
        id: Uuid::new_v4(),
        name,
        description: params.description,
        difficulty: params.difficulty,
        duration: params.duration,
        source: params.source,
        routine_exercises: params.routine_exercises_attributes.unwrap_or_default(),
    };
    store.routines.insert(routine.id, routine.clone());
    tracing::info!(id = %routine.id, source = ?routine.source, "routine created");
    Ok((StatusCode::CREATED, Json(routine)))
}

async fn update_routine(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<RoutineBody>,
) -> Result<Json<Routine>, Failure> {
    let mut store = db.write().await;
    if !store.routines.contains_key(&id) {
        return Err(Failure::not_found());
    }
    let params = input.routine;
    if let Some(name) = &params.name {
        validate_name(&store, name, Some(id))?;
    }
    let routine = store.routines.get_mut(&id).ok_or_else(Failure::not_found)?;
    if let Some(name) = params.name {
        routine.name = name;
    }
    if params.description.is_some() {
        routine.description = params.description;
    }
    if params.difficulty.is_some() {
        routine.difficulty = params.difficulty;
    }
    if params.duration.is_some() {
        routine.duration = params.duration;
    }
    if let Some(exercises) = params.routine_exercises_attributes {
        routine.routine_exercises = exercises;
    }
    Ok(Json(routine.clone()))
}

async fn delete_routine(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<StatusCode, Failure> {
    db.write()
        .await
        .routines
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(Failure::not_found)
}

// ---------------------------------------------------------------------------
// AI generation
// ---------------------------------------------------------------------------

/// Field-level validation of a generation request. Fields are checked as
/// goal, age, then days_per_week.
fn generation_details(input: &GenerateRoutines) -> serde_json::Map<String, Value> {
    let mut details = serde_json::Map::new();
    if let Some(goal) = input.profile.get("goal") {
        if !goal.as_str().is_some_and(|g| VALID_GOALS.contains(&g)) {
            details.insert("goal".to_string(), json!(["debe ser un objetivo válido"]));
        }
    }
    if let Some(age) = input.profile.get("age") {
        if !age.as_u64().is_some_and(|a| (13..=100).contains(&a)) {
            details.insert("age".to_string(), json!(["debe estar entre 13 y 100"]));
        }
    }
    if let Some(days) = input.preferences.get("days_per_week") {
        if !days.as_u64().is_some_and(|d| (1..=7).contains(&d)) {
            details.insert("days_per_week".to_string(), json!(["debe estar entre 1 y 7"]));
        }
    }
    details
}

async fn generate_routines(State(db): State<Db>, Json(input): Json<GenerateRoutines>) -> Response {
    let details = generation_details(&input);
    if !details.is_empty() {
        return Failure {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: json!({"success": false, "error": "Validation failed", "details": details}),
        }
        .into_response();
    }

    let store = db.read().await;
    let mut exercise_ids: Vec<Uuid> = store.exercises.keys().copied().collect();
    exercise_ids.sort();
    let goal = input.profile.get("goal").and_then(Value::as_str).unwrap_or("maintain");

    let routines: Vec<Value> = ["A", "B"]
        .iter()
        .map(|label| {
            let exercises: Vec<Value> = exercise_ids
                .iter()
                .take(3)
                .map(|id| json!({"exercise_id": id, "sets": 3, "reps": 12}))
                .collect();
            json!({
                "name": format!("Rutina {label} ({goal})"),
                "description": "Generada automáticamente",
                "difficulty": "beginner",
                "duration": 30,
                "exercises": exercises,
            })
        })
        .collect();
    Json(json!({"success": true, "data": {"routines": routines}})).into_response()
}
