//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every service over
//! real HTTP through `ReqwestClient`. Validates that request building,
//! status normalization and body decoding agree with the server's schema.

use fitness_core::types::{
    AiRoutine, AiRoutineExercise, AttemptStatus, CompleteAttempt, ExerciseTime, ExerciseUpdate, FitnessProfile,
    NewChallenge, NewExercise, RoutineGenerationRequest, RoutinePreferences, WorkoutInput,
};
use fitness_core::{
    AiRoutineService, ApiClient, ApiError, ChallengeAttemptService, ChallengeService, ClientConfig, ExerciseService,
    UserStatsService, WorkoutService,
};
use uuid::Uuid;

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener).await.unwrap() });
    format!("http://{addr}")
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::from_config(ClientConfig::new(base_url).with_token("integration")).unwrap()
}

fn new_exercise(name: &str) -> NewExercise {
    NewExercise {
        name: name.to_string(),
        description: None,
        muscle_group: Some("legs".to_string()),
        equipment: None,
        difficulty: None,
    }
}

#[tokio::test]
async fn challenge_lifecycle() {
    let base = start_server().await;
    let challenges = ChallengeService::new(client(&base));
    let attempts = ChallengeAttemptService::new(client(&base));

    // Step 1: create and list.
    let challenge = challenges
        .create_challenge(&NewChallenge {
            name: "Burpees x50".to_string(),
            description: Some("50 burpees lo más rápido posible".to_string()),
            difficulty: Some("hard".to_string()),
            time_limit_seconds: Some(900),
            exercises: Vec::new(),
        })
        .await
        .unwrap();
    let listed = challenges.get_challenges().await.unwrap();
    assert_eq!(listed, vec![challenge.clone()]);

    // Step 2: a duplicate name is a conflict with challenge wording.
    let err = challenges
        .create_challenge(&NewChallenge {
            name: "Burpees x50".to_string(),
            description: None,
            difficulty: None,
            time_limit_seconds: None,
            exercises: Vec::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Ya existe un desafío con ese nombre");

    // Step 3: start, then fail to start a second attempt.
    let attempt = attempts.start_attempt(challenge.id).await.unwrap();
    assert_eq!(attempt.status, AttemptStatus::InProgress);
    let err = attempts.start_attempt(challenge.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Ya tienes un intento en curso para este desafío");

    // Step 4: complete.
    let completion = attempts
        .complete_attempt(
            challenge.id,
            attempt.id,
            &CompleteAttempt {
                completion_time_seconds: 420,
                exercise_times: vec![ExerciseTime {
                    exercise_id: Uuid::nil(),
                    time_seconds: 420,
                }],
            },
        )
        .await
        .unwrap();
    assert_eq!(completion.attempt.unwrap().status, AttemptStatus::Completed);
    assert_eq!(completion.leaderboard_position, Some(1));
    assert!(completion.is_new_personal_best);

    // Step 5: abandoning a finished attempt falls back to the standard 409 text.
    let err = attempts.abandon_attempt(challenge.id, attempt.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Conflicto en el recurso");

    // Step 6: leaderboard and history.
    let board = challenges.get_challenge_leaderboard(challenge.id).await.unwrap().unwrap();
    assert_eq!(board.entries.len(), 1);
    assert_eq!(board.entries[0].completion_time_seconds, 420);
    assert_eq!(attempts.get_challenge_attempts(challenge.id).await.unwrap().len(), 1);
    assert_eq!(attempts.get_my_attempts().await.unwrap().len(), 1);

    // Step 7: delete, then it is gone.
    challenges.delete_challenge(challenge.id).await.unwrap();
    let err = challenges.get_challenge(challenge.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Desafío no encontrado");
    let err = attempts.get_challenge_attempts(challenge.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Recurso no encontrado");
}

#[tokio::test]
async fn exercise_and_workout_crud() {
    let base = start_server().await;
    let exercises = ExerciseService::new(client(&base));
    let workouts = WorkoutService::new(client(&base));

    let squat = exercises.create_exercise(&new_exercise("Sentadilla")).await.unwrap();
    let err = exercises.create_exercise(&new_exercise("")).await.unwrap_err();
    assert_eq!(err.to_string(), "Name can't be blank");

    let renamed = exercises
        .update_exercise(
            squat.id,
            &ExerciseUpdate {
                name: Some("Sentadilla búlgara".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Sentadilla búlgara");
    assert_eq!(renamed.muscle_group.as_deref(), Some("legs"));

    let with_video = exercises
        .update_video_url(squat.id, "https://videos.example.com/squat.mp4")
        .await
        .unwrap();
    assert_eq!(with_video.video_url.as_deref(), Some("https://videos.example.com/squat.mp4"));
    let err = exercises.update_video_url(squat.id, "ftp://nope").await.unwrap_err();
    assert_eq!(err.to_string(), "La URL del video no es válida");

    let workout = workouts
        .create_workout(WorkoutInput {
            name: Some("Piernas".to_string()),
            duration: Some(45),
            routine_exercises_attributes: vec![fitness_core::types::RoutineExerciseInput {
                exercise_id: squat.id,
                sets: Some(4),
                reps: Some(8),
                rest_time: 90,
                order: 1,
            }],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(workouts.get_workouts().await.unwrap().len(), 1);

    // The exercise is referenced by a routine.
    let err = exercises.delete_exercise(squat.id).await.unwrap_err();
    assert_eq!(err.to_string(), "No se puede eliminar un ejercicio que está en uso");

    let updated = workouts
        .update_workout(
            workout.id,
            WorkoutInput {
                description: Some("Día de pierna".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("Día de pierna"));
    assert_eq!(updated.routine_exercises.len(), 1);

    workouts.delete_workout(workout.id).await.unwrap();
    let err = workouts.get_workout(workout.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Rutina no encontrada");

    exercises.delete_exercise(squat.id).await.unwrap();
    let err = exercises.get_exercise(squat.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Ejercicio no encontrado");
}

#[tokio::test]
async fn ai_generation_and_batch_save() {
    let base = start_server().await;
    let ai = AiRoutineService::new(client(&base));
    let workouts = WorkoutService::new(client(&base));
    let exercises = ExerciseService::new(client(&base));
    let pushup = exercises.create_exercise(&new_exercise("Flexiones")).await.unwrap();

    let err = ai
        .generate_routines(&RoutineGenerationRequest {
            profile: FitnessProfile {
                goal: Some("fly".to_string()),
                ..Default::default()
            },
            preferences: RoutinePreferences::default(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Datos inválidos:\ngoal: debe ser un objetivo válido");

    let routines = ai
        .generate_routines(&RoutineGenerationRequest {
            profile: FitnessProfile {
                age: Some(28),
                goal: Some("gain_muscle".to_string()),
                ..Default::default()
            },
            preferences: RoutinePreferences {
                days_per_week: Some(4),
                ..Default::default()
            },
        })
        .await
        .unwrap();
    assert_eq!(routines.len(), 2);
    assert_eq!(routines[0].exercises[0].exercise_id, pushup.id);

    let summary = ai.save_generated_routines(&routines).await;
    assert_eq!((summary.success, summary.failed), (2, 0));

    // Same names again: every save is rejected but reported, not raised.
    let summary = ai.save_generated_routines(&routines).await;
    assert_eq!((summary.success, summary.failed), (0, 2));
    assert_eq!(summary.results[0].error.as_ref().unwrap()["errors"][0], "Name has already been taken");

    // Explicit zeros: rest_time stays 0, order falls back to the position.
    let summary = ai
        .save_generated_routines(&[AiRoutine {
            name: "Ceros".to_string(),
            description: None,
            difficulty: None,
            duration: None,
            exercises: vec![AiRoutineExercise {
                exercise_id: pushup.id,
                name: None,
                sets: Some(3),
                reps: Some(15),
                rest_time: Some(0),
                order: Some(0),
            }],
        }])
        .await;
    let saved = summary.results[0].data.clone().unwrap();
    let fetched = workouts.get_workout(saved.id).await.unwrap();
    assert_eq!(fetched.routine_exercises[0].rest_time, 0);
    assert_eq!(fetched.routine_exercises[0].order, 1);
    assert_eq!(fetched.source.as_deref(), Some("ai_generated"));

    let stats = UserStatsService::new(client(&base)).get_user_stats().await.unwrap();
    assert_eq!(stats.total_workouts, 3);
    assert_eq!(stats.total_exercises, 1);
}

#[tokio::test]
async fn unauthenticated_requests() {
    let base = start_server().await;
    let anonymous = ApiClient::from_config(ClientConfig::new(&base)).unwrap();

    let err = ExerciseService::new(anonymous.clone()).get_exercises().await.unwrap_err();
    assert_eq!(err.to_string(), "No estás autorizado");

    let err = UserStatsService::new(anonymous.clone()).get_user_stats().await.unwrap_err();
    assert_eq!(err.to_string(), "Inicia sesión para ver tus estadísticas");

    // Generation does not map 401 and hands back the raw failure.
    let err = AiRoutineService::new(anonymous)
        .generate_routines(&RoutineGenerationRequest::default())
        .await
        .unwrap_err();
    match err {
        ApiError::Raw(raw) => {
            assert_eq!(raw.status(), Some(401));
            assert_eq!(raw.data().unwrap()["error"], "Not authenticated");
        }
        other => panic!("expected raw error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = ExerciseService::new(client(&format!("http://{addr}")))
        .get_exercises()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Normalized { status: None, .. }));
    assert!(!err.to_string().is_empty());
}
