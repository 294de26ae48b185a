//! Scripted `HttpClient` for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::http::{HttpClient, HttpRequest, HttpResponse};

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;
type Delay = Box<dyn Fn(&HttpRequest) -> Option<Duration> + Send + Sync>;

/// Answers every request with `responder` and records it once answered,
/// so `requests()` is in completion order.
pub(crate) struct FakeHttp {
    responder: Responder,
    delay: Delay,
    requests: Mutex<Vec<HttpRequest>>,
}

impl Default for FakeHttp {
    fn default() -> Self {
        Self::respond(|_| Ok(FakeHttp::json(200, Value::Null)))
    }
}

impl FakeHttp {
    pub(crate) fn respond(
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            delay: Box::new(|_: &HttpRequest| None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Hold back the answer to requests matching `matches` by `delay`.
    pub(crate) fn delay_when(
        mut self,
        matches: impl Fn(&HttpRequest) -> bool + Send + Sync + 'static,
        delay: Duration,
    ) -> Self {
        self.delay = Box::new(move |req: &HttpRequest| matches(req).then_some(delay));
        self
    }

    pub(crate) fn json(status: u16, body: Value) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Some(delay) = (self.delay)(&request) {
            tokio::time::sleep(delay).await;
        }
        let response = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}
