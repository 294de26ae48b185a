//! Async API client core for the fitness backend.
//!
//! # Overview
//! Wraps the backend's REST endpoints (challenges, challenge attempts,
//! exercises, workouts, AI routine generation, user stats) and turns every
//! failure into a single `ApiError` whose message is ready to show to the
//! user.
//!
//! # Design
//! - `ApiClient` builds `HttpRequest` values and hands them to an injected
//!   `HttpClient`; `ReqwestClient` is the production transport.
//! - `normalize` maps failed calls to messages. Each service supplies its
//!   mapping as an `ErrorCatalog` or a per-call `MessageMap`.
//! - `envelope` unwraps `{ success, data, message }` bodies with
//!   `parse_enveloped`; endpoints that return their payload directly are
//!   decoded with `parse_direct`.
//! - `executor` ties the two together around a single call.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod http;
pub mod normalize;
pub mod services;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use envelope::{handle_api_response, parse_direct, parse_enveloped, Envelope};
pub use error::{ApiError, ConfigError, ErrorResponse, RawApiError, TransportError};
pub use executor::{execute_api_call, execute_with};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use normalize::{handle_api_error, messages, ErrorCatalog, MessageMap};
pub use services::{
    AiRoutineService, ChallengeAttemptService, ChallengeService, ExerciseService, UserStatsService, WorkoutService,
};
pub use transport::ReqwestClient;
