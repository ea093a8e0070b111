//! Public read endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use folio_cache::ReadOptions;
use folio_core::{
    Course, CourseFilter, ProcessStep, Project, ProjectFilter, Record, Service, ServicePackage,
    TeamMember, WebsiteSnapshot,
};
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::ReadQuery;
use crate::state::AppState;

fn public_only<T: Record>(items: &mut Vec<T>) {
    items.retain(T::is_public);
}

/// GET /api/website
/// Documento completo del sitio, sin borradores.
#[instrument(skip_all, fields(force_refresh = query.force_refresh))]
pub async fn get_website(
    State(state): State<AppState>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<WebsiteSnapshot>, AppError> {
    let options = ReadOptions {
        force_refresh: query.force_refresh,
        ..ReadOptions::default()
    };
    let mut snapshot = state.content().get_website_data(options).await?;

    public_only(&mut snapshot.services);
    public_only(&mut snapshot.courses);
    public_only(&mut snapshot.projects);
    public_only(&mut snapshot.team);
    public_only(&mut snapshot.process);
    public_only(&mut snapshot.packages);
    Ok(Json(snapshot))
}

/// GET /api/courses?category&provider
pub async fn list_courses(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(state.content().get_courses(&filter).await?))
}

/// GET /api/projects?category&featured
pub async fn list_projects(
    State(state): State<AppState>,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.content().get_projects(&filter).await?))
}

/// GET /api/services
pub async fn list_services(State(state): State<AppState>) -> Result<Json<Vec<Service>>, AppError> {
    Ok(Json(state.content().get_services().await?))
}

/// GET /api/services/{slug}
/// Acepta id, slug o slug legacy.
#[instrument(skip(state))]
pub async fn get_service(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Service>, AppError> {
    Ok(Json(state.content().get_service(&slug).await?))
}

/// GET /api/team
pub async fn list_team(State(state): State<AppState>) -> Result<Json<Vec<TeamMember>>, AppError> {
    Ok(Json(state.content().get_team().await?))
}

/// GET /api/process
pub async fn list_process(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProcessStep>>, AppError> {
    Ok(Json(state.content().get_process().await?))
}

/// GET /api/packages
pub async fn list_packages(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServicePackage>>, AppError> {
    Ok(Json(state.content().get_packages().await?))
}
