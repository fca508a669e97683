//! Regimen read and table edit endpoints.
//!
//! A `GET` on a table is a render pass: it returns the current rows and
//! records them as that table's last-rendered snapshot. A `PUT` submits
//! the full edited contents, which replace the stored table only when
//! they differ from the snapshot.

use std::sync::Arc;

use axum::extract::Path;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::models::{
    ChemotherapyMedication, DosingEntry, PhaseId, PretreatmentMedication, Regimen, TargetedTherapy,
};
use crate::session::SessionContext;
use crate::view::{SubmitOutcome, TableKind};

#[derive(Serialize)]
pub struct TableResponse {
    pub rows: serde_json::Value,
}

#[derive(Deserialize)]
pub struct TableSubmitRequest {
    pub rows: Vec<serde_json::Value>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub outcome: SubmitOutcome,
}

#[derive(Serialize)]
pub struct TherapiesResponse {
    pub therapies: Vec<TargetedTherapy>,
}

/// `GET /api/regimen` — the session's whole regimen.
pub async fn get_regimen(
    Extension(session): Extension<Arc<SessionContext>>,
) -> Result<Json<Regimen>, ApiError> {
    let guard = session.state.lock().await;
    Ok(Json(guard.regimen.clone()))
}

/// `GET /api/regimen/phases/{phase}/tables/{table}` — render one table.
pub async fn render_table(
    Extension(session): Extension<Arc<SessionContext>>,
    Path((phase, table)): Path<(String, String)>,
) -> Result<Json<TableResponse>, ApiError> {
    let phase = phase_from(&phase)?;
    let table = table_from(&table)?;

    let mut guard = session.state.lock().await;
    let state = &mut *guard;

    let rows = match table {
        TableKind::Pretreatment => {
            serde_json::to_value(state.view.render_pretreatment(phase, &state.regimen))
        }
        TableKind::Chemotherapy => {
            serde_json::to_value(state.view.render_chemotherapy(phase, &state.regimen))
        }
    }
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(TableResponse { rows }))
}

/// `PUT /api/regimen/phases/{phase}/tables/{table}` — submit the full
/// edited table.
///
/// Row shapes are fixed; an unknown column is a validation error and
/// the store is left untouched. Contents identical to the last render
/// are a no-op.
pub async fn submit_table(
    Extension(session): Extension<Arc<SessionContext>>,
    Path((phase, table)): Path<(String, String)>,
    Json(body): Json<TableSubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let phase = phase_from(&phase)?;
    let table = table_from(&table)?;

    let mut guard = session.state.lock().await;
    let state = &mut *guard;

    let outcome = match table {
        TableKind::Pretreatment => {
            let rows: Vec<PretreatmentMedication> = parse_rows(body.rows)?;
            state.view.submit_pretreatment(phase, &mut state.regimen, rows)
        }
        TableKind::Chemotherapy => {
            let rows: Vec<ChemotherapyMedication> = parse_rows(body.rows)?;
            state.view.submit_chemotherapy(phase, &mut state.regimen, rows)
        }
    };

    if outcome.replaced() {
        tracing::info!(
            session_id = %session.id,
            phase = phase.as_str(),
            table = table.as_str(),
            "table replaced"
        );
    }

    Ok(Json(SubmitResponse { outcome }))
}

/// `GET /api/regimen/phases/{phase}/therapies` — render the targeted
/// therapy sub-tables, one per therapy.
pub async fn render_therapies(
    Extension(session): Extension<Arc<SessionContext>>,
    Path(phase): Path<String>,
) -> Result<Json<TherapiesResponse>, ApiError> {
    let phase = phase_from(&phase)?;

    let mut guard = session.state.lock().await;
    let state = &mut *guard;
    let therapies = state.view.render_therapies(phase, &state.regimen);

    Ok(Json(TherapiesResponse { therapies }))
}

/// `PUT /api/regimen/phases/{phase}/therapies/{name}/dosing` — submit
/// the edited dosing rows of one named therapy.
pub async fn submit_dosing(
    Extension(session): Extension<Arc<SessionContext>>,
    Path((phase, name)): Path<(String, String)>,
    Json(body): Json<TableSubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let phase = phase_from(&phase)?;

    let mut guard = session.state.lock().await;
    let state = &mut *guard;

    let rows: Vec<DosingEntry> = parse_rows(body.rows)?;
    let outcome = state
        .view
        .submit_dosing(phase, &mut state.regimen, &name, rows)?;

    if outcome.replaced() {
        tracing::info!(
            session_id = %session.id,
            phase = phase.as_str(),
            therapy = %name,
            "dosing replaced"
        );
    }

    Ok(Json(SubmitResponse { outcome }))
}

fn phase_from(segment: &str) -> Result<PhaseId, ApiError> {
    PhaseId::from_path(segment).ok_or(ApiError::NotFound(format!("Unknown phase: {segment}")))
}

fn table_from(segment: &str) -> Result<TableKind, ApiError> {
    TableKind::from_path(segment).ok_or(ApiError::NotFound(format!("Unknown table: {segment}")))
}

fn parse_rows<T: serde::de::DeserializeOwned>(
    rows: Vec<serde_json::Value>,
) -> Result<Vec<T>, ApiError> {
    serde_json::from_value(serde_json::Value::Array(rows))
        .map_err(|e| ApiError::Validation(e.to_string()))
}
