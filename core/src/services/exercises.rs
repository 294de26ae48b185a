//! Exercise library CRUD.

use serde_json::json;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::envelope::parse_direct;
use crate::error::ApiError;
use crate::executor::execute_api_call;
use crate::normalize::{messages, MessageMap};
use crate::types::{Exercise, ExerciseUpdate, NewExercise};

const EXERCISES_PATH: &str = "/exercises";
const NOT_FOUND: &str = "Ejercicio no encontrado";

#[derive(Debug, Clone)]
pub struct ExerciseService {
    client: ApiClient,
}

impl ExerciseService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_exercises(&self) -> Result<Vec<Exercise>, ApiError> {
        let request = self.client.get(EXERCISES_PATH);
        let response = execute_api_call(|| self.client.send(request), &MessageMap::new()).await?;
        parse_direct(&response.body)
    }

    pub async fn get_exercise(&self, id: Uuid) -> Result<Exercise, ApiError> {
        let request = self.client.get(&format!("{EXERCISES_PATH}/{id}"));
        let response = execute_api_call(|| self.client.send(request), &messages([(404, NOT_FOUND)])).await?;
        parse_direct(&response.body)
    }

    pub async fn create_exercise(&self, input: &NewExercise) -> Result<Exercise, ApiError> {
        let request = self.client.post(EXERCISES_PATH, &json!({ "exercise": input }))?;
        let response = execute_api_call(|| self.client.send(request), &MessageMap::new()).await?;
        parse_direct(&response.body)
    }

    pub async fn update_exercise(&self, id: Uuid, update: &ExerciseUpdate) -> Result<Exercise, ApiError> {
        let request = self
            .client
            .patch(&format!("{EXERCISES_PATH}/{id}"), &json!({ "exercise": update }))?;
        let response = execute_api_call(|| self.client.send(request), &messages([(404, NOT_FOUND)])).await?;
        parse_direct(&response.body)
    }

    pub async fn delete_exercise(&self, id: Uuid) -> Result<(), ApiError> {
        let request = self.client.delete(&format!("{EXERCISES_PATH}/{id}"));
        let custom = messages([
            (404, NOT_FOUND),
            (409, "No se puede eliminar un ejercicio que está en uso"),
        ]);
        execute_api_call(|| self.client.send(request), &custom).await?;
        Ok(())
    }

    pub async fn update_video_url(&self, id: Uuid, video_url: &str) -> Result<Exercise, ApiError> {
        let request = self
            .client
            .put(&format!("{EXERCISES_PATH}/{id}/video_url"), &json!({ "video_url": video_url }))?;
        let custom = messages([(404, NOT_FOUND), (422, "La URL del video no es válida")]);
        let response = execute_api_call(|| self.client.send(request), &custom).await?;
        parse_direct(&response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::services::test_support::{client_with, BASE_URL};
    use crate::testing::FakeHttp;
    use serde_json::Value;

    fn exercise_json(id: Uuid, name: &str) -> Value {
        json!({"id": id, "name": name, "muscle_group": "legs"})
    }

    #[tokio::test]
    async fn list_exercises() {
        let id = Uuid::new_v4();
        let (client, fake) = client_with(FakeHttp::respond(move |_| {
            Ok(FakeHttp::json(200, json!([exercise_json(id, "Sentadilla")])))
        }));
        let exercises = ExerciseService::new(client).get_exercises().await.unwrap();
        assert_eq!(exercises[0].name, "Sentadilla");
        assert_eq!(exercises[0].muscle_group.as_deref(), Some("legs"));
        assert_eq!(fake.requests()[0].url, format!("{BASE_URL}/exercises"));
    }

    #[tokio::test]
    async fn get_missing_exercise() {
        let (client, _) = client_with(FakeHttp::respond(|_| Ok(FakeHttp::json(404, json!({"error": "x"})))));
        let err = ExerciseService::new(client).get_exercise(Uuid::nil()).await.unwrap_err();
        assert_eq!(err.to_string(), "Ejercicio no encontrado");
    }

    #[tokio::test]
    async fn update_sends_patch_with_only_changed_fields() {
        let id = Uuid::new_v4();
        let (client, fake) = client_with(FakeHttp::respond(move |_| Ok(FakeHttp::json(200, exercise_json(id, "Zancada")))));
        let update = ExerciseUpdate {
            name: Some("Zancada".to_string()),
            ..Default::default()
        };
        let exercise = ExerciseService::new(client).update_exercise(id, &update).await.unwrap();
        assert_eq!(exercise.name, "Zancada");

        let sent = &fake.requests()[0];
        assert_eq!(sent.method, HttpMethod::Patch);
        let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"exercise": {"name": "Zancada"}}));
    }

    #[tokio::test]
    async fn create_validation_errors_are_joined() {
        let (client, _) = client_with(FakeHttp::respond(|_| {
            Ok(FakeHttp::json(422, json!({"errors": ["Name can't be blank"]})))
        }));
        let input = NewExercise {
            name: String::new(),
            description: None,
            muscle_group: None,
            equipment: None,
            difficulty: None,
        };
        let err = ExerciseService::new(client).create_exercise(&input).await.unwrap_err();
        assert_eq!(err.to_string(), "Name can't be blank");
    }

    #[tokio::test]
    async fn delete_in_use_exercise() {
        let (client, _) = client_with(FakeHttp::respond(|_| Ok(FakeHttp::json(409, json!({"error": "in use"})))));
        let err = ExerciseService::new(client).delete_exercise(Uuid::nil()).await.unwrap_err();
        assert_eq!(err.to_string(), "No se puede eliminar un ejercicio que está en uso");
    }

    #[tokio::test]
    async fn video_url_uses_put_on_sub_resource() {
        let id = Uuid::new_v4();
        let (client, fake) = client_with(FakeHttp::respond(move |_| Ok(FakeHttp::json(200, exercise_json(id, "Remo")))));
        ExerciseService::new(client)
            .update_video_url(id, "https://videos.example.com/remo.mp4")
            .await
            .unwrap();

        let sent = &fake.requests()[0];
        assert_eq!(sent.method, HttpMethod::Put);
        assert_eq!(sent.url, format!("{BASE_URL}/exercises/{id}/video_url"));
        let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["video_url"], "https://videos.example.com/remo.mp4");
    }

    #[tokio::test]
    async fn invalid_video_url_overrides_error_list() {
        let (client, _) = client_with(FakeHttp::respond(|_| {
            Ok(FakeHttp::json(422, json!({"errors": ["Video url is invalid"]})))
        }));
        let err = ExerciseService::new(client)
            .update_video_url(Uuid::nil(), "nope")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "La URL del video no es válida");
    }
}
