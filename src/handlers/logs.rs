use actix_web::{web, HttpResponse};
use serde_json::Value;
use uuid::Uuid;

use crate::db::LogStore;
use crate::errors::AppError;
use crate::utils::validation::{validate_log_update, validate_new_log};

// GET /logs
pub async fn list_logs(store: web::Data<dyn LogStore>) -> Result<HttpResponse, AppError> {
    let sessions = store
        .list_sessions()
        .await
        .map_err(|e| AppError::InternalServerError(format!("Storage error: {}", e)))?;

    Ok(HttpResponse::Ok().json(sessions))
}

// POST /logs
pub async fn create_log(
    store: web::Data<dyn LogStore>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let new_log = validate_new_log(&payload).map_err(|err| AppError::BadRequest(err.to_string()))?;

    let log = store
        .create_log(new_log)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Storage error: {}", e)))?;

    Ok(HttpResponse::Created().json(log))
}

// PUT /logs/:logId
pub async fn update_log(
    store: web::Data<dyn LogStore>,
    log_id: web::Path<Uuid>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    // Validation runs before the id lookup, so a bad payload against a
    // missing id still reports the validation error.
    let update =
        validate_log_update(&payload).map_err(|err| AppError::BadRequest(err.to_string()))?;

    let log = store
        .update_log(*log_id, update)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Storage error: {}", e)))?
        .ok_or_else(|| AppError::NotFound("Log not found".to_string()))?;

    Ok(HttpResponse::Ok().json(log))
}

// DELETE /logs/:logId
pub async fn delete_log(
    store: web::Data<dyn LogStore>,
    log_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let removed = store
        .remove_log(*log_id)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Storage error: {}", e)))?;

    if !removed {
        return Err(AppError::NotFound("Log not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Log deleted" })))
}
