//! Uniform failure handling around a single API call.

use std::future::Future;

use crate::error::{ApiError, RawApiError};
use crate::normalize::{ErrorCatalog, MessageMap};

/// Run `call` and normalize its failure with the shared mapping.
///
/// The success value is returned untouched, whatever its shape. `call` is a
/// zero-argument closure so call sites can capture their request parameters.
pub async fn execute_api_call<T, F, Fut>(call: F, custom: &MessageMap) -> Result<T, ApiError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, RawApiError>>,
{
    execute_with(ErrorCatalog::standard(), call, custom).await
}

/// Same as `execute_api_call` with an explicit catalog.
pub async fn execute_with<T, F, Fut>(catalog: &ErrorCatalog, call: F, custom: &MessageMap) -> Result<T, ApiError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, RawApiError>>,
{
    call().await.map_err(|raw| catalog.normalize(raw, custom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{handle_api_error, messages};
    use serde_json::json;

    #[tokio::test]
    async fn passes_success_values_through() {
        let none = MessageMap::new();
        let list = execute_api_call(|| async { Ok::<_, RawApiError>(vec![1, 2, 3]) }, &none).await;
        assert_eq!(list.unwrap(), vec![1, 2, 3]);

        let text = execute_api_call(|| async { Ok::<_, RawApiError>("hola") }, &none).await;
        assert_eq!(text.unwrap(), "hola");

        let object = execute_api_call(|| async { Ok::<_, RawApiError>(json!({"id": 7})) }, &none).await;
        assert_eq!(object.unwrap(), json!({"id": 7}));
    }

    #[tokio::test]
    async fn failure_matches_handle_api_error() {
        let custom = messages([(409, "Ya tienes un intento en curso para este desafío")]);
        let raw = RawApiError::with_response(409, json!({"error": "duplicate"}));

        let expected = handle_api_error(raw.clone(), &custom);
        let err = execute_api_call(move || async move { Err::<(), _>(raw) }, &custom).await.unwrap_err();
        assert_eq!(err, expected);
        assert_eq!(err.to_string(), "Ya tienes un intento en curso para este desafío");
    }

    #[tokio::test]
    async fn closure_captures_request_parameters() {
        let id = 42u32;
        let doubled = execute_api_call(move || async move { Ok::<_, RawApiError>(id * 2) }, &MessageMap::new()).await;
        assert_eq!(doubled.unwrap(), 84);
    }
}
