use crate::{AppState, auth::RequireAdmin, error::AppError};
use axum::{Json, extract::State};
use chrono::Utc;
use kpi_engine::KpiSnapshot;
use serde::Serialize;
use std::sync::Arc;

/// Response envelope for the admin KPI endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct KpiResponse {
    pub success: bool,
    pub kpis: KpiSnapshot,
}

/// # GET /api/admin/kpis
///
/// Computes a fresh KPI snapshot from a full read of the entity collections.
/// Nothing is cached or persisted: every call re-reads and re-derives, so the
/// response always reflects the store at the time of the request.
pub async fn get_admin_kpis(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> Result<Json<KpiResponse>, AppError> {
    let data = state.repo.fetch_snapshot().await?;
    let kpis = state.engine.compute(&data, Utc::now())?;
    Ok(Json(KpiResponse {
        success: true,
        kpis,
    }))
}
