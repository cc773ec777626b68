use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use tracing::{debug, info};

use super::SharedBackend;
use super::error::GatewayError;
use super::protocol::{
    DeleteValueResponse, GetValueResponse, MessageResponse, SetValueRequest, SetValueResponse,
};

/// Key probed by the `/test` route
const PROBE_KEY: &str = "testKey";

fn required(field: &str, value: Option<String>) -> Result<String, GatewayError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        Some(_) => Err(GatewayError::BadRequest(format!(
            "field `{}` must not be empty",
            field
        ))),
        None => Err(GatewayError::BadRequest(format!(
            "missing required field `{}`",
            field
        ))),
    }
}

pub async fn handle_test(
    State(backend): State<SharedBackend>,
) -> Result<Json<MessageResponse>, GatewayError> {
    let resp = backend
        .get_value(PROBE_KEY.to_string())
        .await
        .map_err(|e| GatewayError::backend("GetValue", e))?;
    info!("Probe: key={} value={:?} found={}", resp.key, resp.value, resp.found);

    Ok(Json(MessageResponse {
        message: "printTest called".to_string(),
    }))
}

pub async fn handle_get(
    State(backend): State<SharedBackend>,
    Path(key): Path<String>,
) -> Result<Json<GetValueResponse>, GatewayError> {
    debug!("Get value called with key: {}", key);

    let resp = backend
        .get_value(key.clone())
        .await
        .map_err(|e| GatewayError::backend("GetValue", e))?;

    Ok(Json(GetValueResponse {
        message: "Get called".to_string(),
        key,
        value: resp.value,
        found: resp.found,
    }))
}

pub async fn handle_set(
    State(backend): State<SharedBackend>,
    payload: Result<Json<SetValueRequest>, JsonRejection>,
) -> Result<Json<SetValueResponse>, GatewayError> {
    let Json(body) = payload.map_err(|e| GatewayError::BadRequest(e.body_text()))?;
    let key = required("key", body.key)?;
    let value = required("value", body.value)?;
    debug!("Set value called with key: {} and value: {}", key, value);

    let resp = backend
        .set_value(key.clone(), value.clone())
        .await
        .map_err(|e| GatewayError::backend("SetValue", e))?;

    Ok(Json(SetValueResponse {
        message: "Set called".to_string(),
        key,
        value,
        response: resp.result,
    }))
}

pub async fn handle_delete(
    State(backend): State<SharedBackend>,
    Path(key): Path<String>,
) -> Result<Json<DeleteValueResponse>, GatewayError> {
    debug!("Delete value called with key: {}", key);

    let resp = backend
        .delete_value(key.clone())
        .await
        .map_err(|e| GatewayError::backend("DeleteValue", e))?;

    Ok(Json(DeleteValueResponse {
        message: "Delete called".to_string(),
        key,
        response: resp.result,
    }))
}
