//! Generic request handlers, one set per record kind via the [`Resource`] marker.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::payload::Payload;
use crate::error::ApiError;
use crate::model::{Kind, Listable, Profiles, Record, Resource, UserScoped};
use crate::store::Store;

pub type Shared = State<Arc<Store>>;

type ApiResult<T> = Result<T, ApiError>;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "FitnessBuddy Backend is running",
    }))
}

pub async fn endpoint_not_found() -> ApiError {
    ApiError::EndpointNotFound
}

pub async fn list<R: Listable>(State(store): Shared) -> ApiResult<Json<Vec<Record>>> {
    Ok(Json(store.all(R::KIND)?))
}

pub async fn list_for_user<R: UserScoped>(
    State(store): Shared,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Record>>> {
    let records = store.filter_by(R::KIND, "user_id", &user_id)?;
    debug!("{} {} records for user {}", records.len(), R::KIND, user_id);
    Ok(Json(records))
}

pub async fn show<R: Resource>(
    State(store): Shared,
    Path(id): Path<String>,
) -> ApiResult<Json<Record>> {
    Ok(Json(store.get(R::KIND, &id)?))
}

pub async fn create<R: Resource>(
    State(store): Shared,
    Payload(payload): Payload,
) -> ApiResult<impl IntoResponse> {
    let record = store.insert(R::KIND, payload)?;
    info!(
        "Created {} {}",
        R::KIND,
        record["id"].as_str().unwrap_or_default()
    );
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update<R: Resource>(
    State(store): Shared,
    Path(id): Path<String>,
    Payload(patch): Payload,
) -> ApiResult<Json<Record>> {
    let record = store.update(R::KIND, &id, patch)?;
    info!("Updated {} {}", R::KIND, id);
    Ok(Json(record))
}

pub async fn destroy<R: Resource>(
    State(store): Shared,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let record = store.delete(R::KIND, &id)?;
    info!("Deleted {} {}", R::KIND, id);
    Ok(Json(json!({
        "message": format!("{} deleted", R::KIND),
        (R::KIND.singular()): record,
    })))
}

pub async fn profile_by_email(
    State(store): Shared,
    Path(email): Path<String>,
) -> ApiResult<Json<Record>> {
    Ok(Json(store.find_by(Profiles::KIND, "email", &email)?))
}

pub async fn profile_by_username(
    State(store): Shared,
    Path(username): Path<String>,
) -> ApiResult<Json<Record>> {
    Ok(Json(store.find_by(Profiles::KIND, "username", &username)?))
}

pub async fn pending_buddies(
    State(store): Shared,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Record>>> {
    let records = store.pending_buddy_requests(&user_id)?;
    debug!("{} pending {} records for user {}", records.len(), Kind::Buddy, user_id);
    Ok(Json(records))
}
