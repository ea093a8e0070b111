//! Admin endpoints.
//!
//! Every handler passes the caller to `ContentService`, which rejects
//! anyone not on the allowlist before touching the store.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use folio_cache::ReadOptions;
use folio_core::{ContactStats, InboxItem, OrderStatistics, Record, WebsiteSection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::content::ContentService;
use crate::error::AppError;
use crate::extractors::{
    Caller, CollectionPath, InquiryStatusPath, ReadQuery, RecordPath, SectionPath, StatusUpdate,
    parse_collection,
};
use crate::state::AppState;

/// Cuerpo de PUT /api/admin/{collection}/{id}/position
#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub position: i64,
}

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub initialized: bool,
    pub message: String,
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

fn decode<T: Record>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid {}: {e}", T::LABEL)))
}

async fn list_all<T: Record>(
    content: &ContentService,
    caller: &Caller,
    options: ReadOptions,
) -> Result<Value, AppError> {
    content.authorize(caller.principal())?;
    to_json(&content.collection::<T>()?.list(options).await?)
}

async fn create<T: Record>(
    content: &ContentService,
    caller: &Caller,
    body: Value,
) -> Result<Value, AppError> {
    content.authorize(caller.principal())?;
    let record: T = decode(body)?;
    to_json(&content.collection::<T>()?.create(caller.principal(), record).await?)
}

/// GET /api/admin/{collection}
/// Lista completa, borradores incluidos.
#[instrument(skip(state, caller, query), fields(collection = %path.collection))]
pub async fn list_records(
    State(state): State<AppState>,
    caller: Caller,
    Path(path): Path<CollectionPath>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<Value>, AppError> {
    let section = parse_collection(&path.collection)?;
    let options = ReadOptions {
        force_refresh: query.force_refresh,
        ..ReadOptions::default()
    };
    let content = state.content();
    let items = with_record_type!(section, T => list_all::<T>(content, &caller, options).await)?;
    Ok(Json(items))
}

/// POST /api/admin/{collection}
#[instrument(skip(state, caller, body), fields(collection = %path.collection))]
pub async fn create_record(
    State(state): State<AppState>,
    caller: Caller,
    Path(path): Path<CollectionPath>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let section = parse_collection(&path.collection)?;
    let content = state.content();
    let created = with_record_type!(section, T => create::<T>(content, &caller, body).await)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/admin/{collection}/{id}
/// Merge de los campos enviados sobre el registro existente.
#[instrument(skip(state, caller, patch), fields(collection = %path.collection, id = %path.id))]
pub async fn update_record(
    State(state): State<AppState>,
    caller: Caller,
    Path(path): Path<RecordPath>,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let section = parse_collection(&path.collection)?;
    let content = state.content();
    let updated = with_record_type!(section, T => {
        let record = content
            .collection::<T>()?
            .update(caller.principal(), &path.id, patch)
            .await?;
        to_json(&record)
    })?;
    Ok(Json(updated))
}

/// DELETE /api/admin/{collection}/{id}
#[instrument(skip(state, caller), fields(collection = %path.collection, id = %path.id))]
pub async fn delete_record(
    State(state): State<AppState>,
    caller: Caller,
    Path(path): Path<RecordPath>,
) -> Result<StatusCode, AppError> {
    let section = parse_collection(&path.collection)?;
    let content = state.content();
    with_record_type!(section, T => {
        content
            .collection::<T>()?
            .delete(caller.principal(), &path.id)
            .await?;
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/admin/{collection}/{id}/position
/// Mueve el registro y renumera la coleccion.
#[instrument(skip(state, caller, request), fields(collection = %path.collection, id = %path.id))]
pub async fn move_record(
    State(state): State<AppState>,
    caller: Caller,
    Path(path): Path<RecordPath>,
    Json(request): Json<PositionRequest>,
) -> Result<Json<Value>, AppError> {
    let section = parse_collection(&path.collection)?;
    let content = state.content();
    let items = with_record_type!(section, T => {
        let items = content
            .collection::<T>()?
            .move_to_position(caller.principal(), &path.id, request.position)
            .await?;
        to_json(&items)
    })?;
    Ok(Json(items))
}

/// GET /api/admin/{collection}/order
/// Huecos y duplicados en el orden de visualizacion.
pub async fn order_statistics(
    State(state): State<AppState>,
    caller: Caller,
    Path(path): Path<CollectionPath>,
) -> Result<Json<OrderStatistics>, AppError> {
    let section = parse_collection(&path.collection)?;
    let content = state.content();
    content.authorize(caller.principal())?;
    let stats = with_record_type!(section, T => {
        Ok::<_, AppError>(content.collection::<T>()?.order_statistics().await?)
    })?;
    Ok(Json(stats))
}

/// PUT /api/admin/website/{section}
#[instrument(skip(state, caller, value), fields(section = %path.section))]
pub async fn update_section(
    State(state): State<AppState>,
    caller: Caller,
    Path(path): Path<SectionPath>,
    Json(value): Json<Value>,
) -> Result<StatusCode, AppError> {
    let section: WebsiteSection = path.section()?;
    state
        .content()
        .update_website_section(caller.principal(), section, value)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/website/initialize
/// Escribe el documento inicial solo si no existe.
pub async fn initialize_website(
    State(state): State<AppState>,
    caller: Caller,
    Json(document): Json<Value>,
) -> Result<Json<InitializeResponse>, AppError> {
    let initialized = state
        .content()
        .initialize_website_data(caller.principal(), document)
        .await?;
    let message = if initialized {
        "Website data initialized"
    } else {
        "Website data already exists"
    };
    Ok(Json(InitializeResponse {
        initialized,
        message: message.to_string(),
    }))
}

/// GET /api/admin/inquiries
/// Contactos y consultas de paquetes, mas recientes primero.
pub async fn list_inquiries(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<InboxItem>>, AppError> {
    Ok(Json(
        state.content().get_all_inquiries(caller.principal()).await?,
    ))
}

/// GET /api/admin/contacts/stats
pub async fn contact_stats(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ContactStats>, AppError> {
    Ok(Json(state.content().contact_stats(caller.principal()).await?))
}

/// PUT /api/admin/inquiries/{kind}/{id}/status
#[instrument(skip(state, caller, update), fields(kind = %path.kind, id = %path.id))]
pub async fn update_inquiry_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(path): Path<InquiryStatusPath>,
    Json(update): Json<StatusUpdate>,
) -> Result<StatusCode, AppError> {
    let kind = path.kind()?;
    state
        .content()
        .update_inquiry_status(caller.principal(), kind, &path.id, update.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
