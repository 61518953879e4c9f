//! Preset API endpoints: resolution for request consumers, nested updates
//! for administrative callers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::api::AppState;
use crate::error::ServiceError;
use crate::preset::{ConfigDocument, ParameterSet};

/// Response for GET /api/presets
#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    /// Durable path of the preset document
    pub path: String,
    /// The full current document
    pub presets: ConfigDocument,
}

/// Query for GET /api/presets/resolve
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub namespace: String,
    pub group: String,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Which fallback level supplied the resolved parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedFrom {
    Mode,
    Group,
    GroupDefault,
    NamespaceDefault,
    None,
}

/// Response for GET /api/presets/resolve
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub params: ParameterSet,
    pub resolved_from: ResolvedFrom,
}

/// Request body for PUT /api/presets
#[derive(Debug, Deserialize)]
pub struct UpdatePresetRequest {
    /// Ordered keys leading to the target field,
    /// e.g. `["preset", "default", "temp"]`
    pub key_path: Vec<String>,
    pub value: Value,
}

/// GET /api/presets - the full current preset document
pub async fn get_presets_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PresetsResponse>, ServiceError> {
    let doc = state.store.document()?;

    Ok(Json(PresetsResponse {
        path: state.store.path().display().to_string(),
        presets: doc.as_ref().clone(),
    }))
}

/// GET /api/presets/resolve - resolve a parameter set for a request.
///
/// This is the canonical caller-composed fallback chain over the store's
/// single-path probes: with a mode, try the mode entry, then the group
/// default, then the namespace default; without one, try the group entry,
/// then the namespace default. Exactly one level's parameter set is
/// returned, never a merge.
pub async fn resolve_preset_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, ServiceError> {
    let store = &state.store;

    if let Some(mode) = &query.mode {
        let params = store.mode_params(&query.namespace, &query.group, mode)?;
        if !params.is_empty() {
            return Ok(resolved(params, ResolvedFrom::Mode));
        }
        let params = store.group_default(&query.namespace, &query.group)?;
        if !params.is_empty() {
            return Ok(resolved(params, ResolvedFrom::GroupDefault));
        }
    } else {
        let params = store.group_params(&query.namespace, &query.group)?;
        if !params.is_empty() {
            return Ok(resolved(params, ResolvedFrom::Group));
        }
    }

    let params = store.namespace_default(&query.namespace)?;
    if !params.is_empty() {
        return Ok(resolved(params, ResolvedFrom::NamespaceDefault));
    }

    Ok(resolved(ParameterSet::new(), ResolvedFrom::None))
}

fn resolved(params: ParameterSet, resolved_from: ResolvedFrom) -> Json<ResolveResponse> {
    Json(ResolveResponse {
        params,
        resolved_from,
    })
}

/// PUT /api/presets - update a nested preset entry and persist the change
pub async fn update_preset_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdatePresetRequest>,
) -> Result<Json<PresetsResponse>, ServiceError> {
    if request.key_path.is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: "key_path must not be empty".to_string(),
        });
    }

    state.store.update_entry(&request.key_path, request.value)?;

    // Return the updated document
    get_presets_handler(State(state)).await
}
