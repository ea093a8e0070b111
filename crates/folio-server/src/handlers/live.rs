//! Server-sent event feeds backed by throttled subscriptions.
//!
//! The subscription lives as long as the response stream: when the client
//! disconnects the stream is dropped and the subscription is cancelled.

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, KeepAliveStream, Sse},
};
use folio_core::{Record, WebsiteSection};
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::Value;
use tracing::info;

use crate::content::ContentService;
use crate::error::AppError;
use crate::extractors::{Caller, SectionPath};
use crate::state::AppState;

type EventStream = BoxStream<'static, Result<Event, axum::Error>>;
type LiveResponse = Sse<KeepAliveStream<EventStream>>;

fn public_json<T: Record>(mut items: Vec<T>) -> Value {
    items.retain(T::is_public);
    serde_json::to_value(items).unwrap_or_else(|_| Value::Array(Vec::new()))
}

fn section_values(
    content: &ContentService,
    section: WebsiteSection,
) -> Result<BoxStream<'static, Value>, AppError> {
    if !section.is_collection() {
        return Ok(content.subscribe_to_section(section)?.boxed());
    }
    with_record_type!(section, T => {
        let feed = content.collection::<T>()?.subscribe();
        Ok(feed.map(public_json::<T>).boxed())
    })
}

/// GET /api/live/{section}
/// Un evento por cambio de la seccion, con el valor publico completo.
pub async fn live_section(
    State(state): State<AppState>,
    Path(path): Path<SectionPath>,
) -> Result<LiveResponse, AppError> {
    let section = path.section()?;
    let values = section_values(state.content(), section)?;
    info!(%section, "Live client connected");

    let name = section.as_str();
    let events = values
        .map(move |value| Event::default().event(name).json_data(value))
        .boxed();
    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(state.keep_alive())))
}

/// GET /api/admin/live/inquiries
/// Bandeja combinada de contactos y consultas, en vivo.
pub async fn live_inquiries(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<LiveResponse, AppError> {
    let admin = state.content().authorize(caller.principal())?;
    info!(by = %admin.email, "Live inbox client connected");

    let feed = state.content().subscribe_to_all_inquiries()?;
    let events = stream::unfold(feed, |mut feed| async move {
        let items = feed.recv().await?;
        Some((items, feed))
    })
    .map(|items| Event::default().event("inquiries").json_data(items))
    .boxed();
    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(state.keep_alive())))
}
