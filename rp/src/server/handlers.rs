//! Route handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::AppState;
use super::error::ApiError;
use crate::domain::{Course, TaskId, TripRequest};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripResponse {
    pub task_id: String,
    pub status: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    pub done: bool,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: Option<String>,
    pub task_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// Start a pipeline run and return its id immediately
pub async fn create_trip(
    State(state): State<AppState>,
    Json(request): Json<TripRequest>,
) -> Result<Json<CreateTripResponse>, ApiError> {
    debug!(theme = %request.theme, location = %request.location, "create_trip: called");
    if request.theme.trim().is_empty() {
        return Err(ApiError::BadRequest("theme is required".to_string()));
    }

    let id = state.pipeline.submit(request.into_pipeline_input()).await?;
    info!(%id, "create_trip: task submitted");
    Ok(Json(CreateTripResponse {
        task_id: id.to_string(),
        status: "processing".to_string(),
    }))
}

/// Poll a task; unknown ids look like a task that has not finished
pub async fn status(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<StatusResponse>, ApiError> {
    let entry = state.registry.get(&TaskId::from(id)).await?;
    Ok(Json(entry.map_or_else(StatusResponse::default, |e| StatusResponse {
        done: e.done,
        success: e.success,
        error: e.error,
    })))
}

async fn successful_course(state: &AppState, id: &TaskId) -> Result<Result<Course, String>, ApiError> {
    Ok(match state.registry.get(id).await? {
        Some(entry) => entry
            .successful_course()
            .cloned()
            .ok_or_else(|| entry.error.unwrap_or_else(|| "the course is not ready yet".to_string())),
        None => Err("unknown task".to_string()),
    })
}

/// Map and chat page for a finished course
pub async fn chat_map(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let id = TaskId::from(id);
    debug!(%id, "chat_map: called");
    match successful_course(&state, &id).await? {
        Ok(course) => {
            let html = state
                .pages
                .chat_map(&id, &course, &state.maps_api_key)
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            Ok(Html(html).into_response())
        }
        Err(reason) => Ok((StatusCode::NOT_FOUND, format!("Failed to build the itinerary: {}", reason)).into_response()),
    }
}

/// Answer a question about a finished course
pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Result<Json<ChatResponse>, ApiError> {
    let (Some(message), Some(task_id)) = (
        request.message.filter(|m| !m.trim().is_empty()),
        request.task_id.filter(|t| !t.trim().is_empty()),
    ) else {
        return Err(ApiError::BadRequest("message or taskId is missing".to_string()));
    };
    let id = TaskId::from(task_id);
    debug!(%id, "chat: called");

    let course = successful_course(&state, &id)
        .await?
        .map_err(|_| ApiError::BadRequest(format!("invalid taskId: {}", id)))?;
    let response = state.chat.reply(&course, &message).await?;
    Ok(Json(ChatResponse { response }))
}

/// Course JSON for a finished task
pub async fn locations(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Course>, ApiError> {
    let id = TaskId::from(id);
    successful_course(&state, &id)
        .await?
        .map(Json)
        .map_err(|_| ApiError::NotFound(format!("invalid taskId: {}", id)))
}
