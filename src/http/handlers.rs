//! Route handlers. Each one is a thin adapter over [`GenerationService`].

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use crate::http::error::AppError;
use crate::llm::TextCompleter;
use crate::service::{GenerationService, Health, SubmitReceipt};
use crate::state_machine::JobSnapshot;
use crate::store::JobStore;

const DEFAULT_AGE: i64 = 15;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default = "default_age")]
    pub age: i64,
    #[serde(default)]
    pub provider: Option<String>,
}

fn default_age() -> i64 {
    DEFAULT_AGE
}

impl Default for SubmitRequest {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            provider: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(flatten)]
    pub receipt: SubmitReceipt,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(flatten)]
    pub snapshot: JobSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub tests: Vec<JobSnapshot>,
}

/// GET /health
pub async fn health<C, S>(State(service): State<Arc<GenerationService<C, S>>>) -> Json<Health>
where
    C: TextCompleter + 'static,
    S: JobStore + 'static,
{
    Json(service.health())
}

/// POST /generate, POST /create-eq-test
///
/// An empty body is accepted and means "age 15, configured provider".
pub async fn submit<C, S>(
    State(service): State<Arc<GenerationService<C, S>>>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, AppError>
where
    C: TextCompleter + 'static,
    S: JobStore + 'static,
{
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        SubmitRequest::default()
    } else {
        serde_json::from_slice::<SubmitRequest>(&body)
            .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?
    };

    let receipt = service.submit(request.age, request.provider.as_deref())?;
    Ok(Json(SubmitResponse {
        success: true,
        receipt,
        message: "Test generation started",
    }))
}

/// GET /status/{test_id}
pub async fn status<C, S>(
    State(service): State<Arc<GenerationService<C, S>>>,
    Path(test_id): Path<String>,
) -> Result<Json<StatusResponse>, AppError>
where
    C: TextCompleter + 'static,
    S: JobStore + 'static,
{
    let snapshot = service.poll(&test_id)?;
    Ok(Json(StatusResponse {
        success: true,
        snapshot,
    }))
}

/// GET /tests
pub async fn list<C, S>(State(service): State<Arc<GenerationService<C, S>>>) -> Json<ListResponse>
where
    C: TextCompleter + 'static,
    S: JobStore + 'static,
{
    Json(ListResponse {
        success: true,
        tests: service.list(),
    })
}
