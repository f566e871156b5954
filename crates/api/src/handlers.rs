//! Request handlers.

use analyzer::{AnalysisOutcome, PipelineState};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use pipeline::{recent, HistoryStatistics, SubmissionRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Returns the comment currently in the slot.
pub(crate) async fn current_comment(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let slot = state.slot.lock().await;
    let comment = slot
        .current()
        .ok_or(ApiError::NotFound("No hay comentario disponible en este momento"))?;
    Ok(Json(json!({
        "success": true,
        "data": { "comentario": comment }
    })))
}

/// Persists an externally analysed comment.
pub(crate) async fn submit_analysis(
    State(state): State<AppState>,
    body: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::InvalidBody)?;
    let record = request.validate()?;

    let record = state
        .store
        .append(record)
        .await
        .map_err(ApiError::Persistence)?;
    state.slot.lock().await.take();

    Ok(Json(json!({
        "success": true,
        "data": record,
        "message": "Análisis del comentario guardado exitosamente"
    })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeRequest {
    comentario: String,
    /// Set when re-submitting text that is already a formalized rewrite.
    #[serde(default)]
    formalizado: bool,
}

/// Runs the analysis pipeline on a comment and persists the result.
///
/// The final comment sits in the slot until the append succeeds.
pub(crate) async fn analyze_comment(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::InvalidBody)?;
    let mut pipeline_state = if request.formalizado {
        PipelineState::already_formalized()
    } else {
        PipelineState::new()
    };

    let draft = match state
        .pipeline
        .analyze(&request.comentario, &mut pipeline_state)
        .await
    {
        AnalysisOutcome::Rejected(_) => return Err(ApiError::Incoherent),
        AnalysisOutcome::Completed(draft) => draft,
    };

    state.slot.lock().await.put(draft.comment.clone());
    let formalized = draft.formalized;
    let original = draft.original.clone();
    let degradations = draft.degradations.clone();

    let record = state
        .store
        .append(draft.into_new_record())
        .await
        .map_err(ApiError::Persistence)?;
    state.slot.lock().await.take();
    info!(id = %record.id, "analysis persisted");

    Ok(Json(json!({
        "success": true,
        "data": record,
        "formalizado": formalized,
        "comentario_original": original,
        "degradaciones": degradations
    })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryQuery {
    ultimos: Option<usize>,
}

/// Lists the history, optionally only the newest `ultimos` records.
pub(crate) async fn list_history(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query.map_err(|_| ApiError::InvalidQuery)?;
    let records = state.store.read_all().await.map_err(ApiError::Internal)?;
    let data = match query.ultimos {
        Some(n) => json!(recent(&records, n)),
        None => json!(records),
    };
    Ok(Json(json!({ "success": true, "data": data })))
}

/// Deletes the whole history.
pub(crate) async fn clear_history(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.store.clear().await.map_err(ApiError::Internal)?;
    Ok(Json(json!({ "success": true, "message": "Historial limpiado" })))
}

/// Category counts and most common tags.
pub(crate) async fn statistics(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let records = state.store.read_all().await.map_err(ApiError::Internal)?;
    Ok(Json(json!({
        "success": true,
        "data": HistoryStatistics::from_records(&records)
    })))
}

pub(crate) async fn not_found() -> ApiError {
    ApiError::NotFound("Endpoint no encontrado")
}

pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
