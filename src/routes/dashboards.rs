use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::dashboards::NewDashboard;
use crate::error::AppError;
use crate::models::dashboard::{
    ALTURA_RANGE, DEFAULT_ALTURA, DEFAULT_LARGURA, LARGURA_RANGE,
};
use crate::models::Dashboard;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub setor: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateDashboard {
    pub titulo: String,
    pub descricao: Option<String>,
    pub setor: String,
    pub url_iframe: String,
    pub ativo: Option<bool>,
    pub largura: Option<i32>,
    pub altura: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateDashboard {
    pub titulo: Option<String>,
    /// An empty string clears the description.
    pub descricao: Option<String>,
    pub setor: Option<String>,
    pub url_iframe: Option<String>,
    pub ativo: Option<bool>,
    pub largura: Option<i32>,
    pub altura: Option<i32>,
}

#[derive(Serialize)]
pub struct DashboardsResponse {
    pub dashboards: Vec<Dashboard>,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub dashboard: Dashboard,
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<DashboardsResponse>, AppError> {
    let setor = query
        .setor
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    // Inactive dashboards stay visible to admins so they can be re-enabled.
    let dashboards = db::dashboards::list(&state.pool, setor, auth.is_admin()).await?;
    Ok(Json(DashboardsResponse { dashboards }))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DashboardResponse>, AppError> {
    let dashboard = db::dashboards::find_by_id(&state.pool, id)
        .await?
        .filter(|d| d.ativo || auth.is_admin())
        .ok_or_else(|| AppError::NotFound("Dashboard not found".to_string()))?;
    Ok(Json(DashboardResponse { dashboard }))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateDashboard>,
) -> Result<(StatusCode, Json<DashboardResponse>), AppError> {
    auth.require_admin()?;

    let new = NewDashboard {
        titulo: req.titulo.trim(),
        descricao: non_blank(req.descricao.as_deref()),
        setor: req.setor.trim(),
        url_iframe: req.url_iframe.trim(),
        ativo: req.ativo.unwrap_or(true),
        largura: req.largura.unwrap_or(DEFAULT_LARGURA),
        altura: req.altura.unwrap_or(DEFAULT_ALTURA),
    };
    validate(&new)?;

    let dashboard = db::dashboards::create(&state.pool, &new, auth.user_id).await?;

    tracing::info!(
        dashboard_id = %dashboard.id,
        user_id = %auth.user_id,
        "Dashboard created"
    );

    Ok((StatusCode::CREATED, Json(DashboardResponse { dashboard })))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDashboard>,
) -> Result<Json<DashboardResponse>, AppError> {
    let existing = db::dashboards::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Dashboard not found".to_string()))?;
    auth.require_admin_or_creator(existing.criado_por)?;

    let descricao = match req.descricao.as_deref() {
        Some(d) => non_blank(Some(d)),
        None => existing.descricao.as_deref(),
    };

    let merged = NewDashboard {
        titulo: req.titulo.as_deref().unwrap_or(&existing.titulo).trim(),
        descricao,
        setor: req.setor.as_deref().unwrap_or(&existing.setor).trim(),
        url_iframe: req.url_iframe.as_deref().unwrap_or(&existing.url_iframe).trim(),
        ativo: req.ativo.unwrap_or(existing.ativo),
        largura: req.largura.unwrap_or(existing.largura),
        altura: req.altura.unwrap_or(existing.altura),
    };
    validate(&merged)?;

    let mut dashboard = db::dashboards::update(&state.pool, id, &merged)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Dashboard not found".to_string()),
            _ => AppError::Database(e),
        })?;
    dashboard.criado_por_nome = existing.criado_por_nome;

    tracing::info!(dashboard_id = %id, user_id = %auth.user_id, "Dashboard updated");

    Ok(Json(DashboardResponse { dashboard }))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let existing = db::dashboards::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Dashboard not found".to_string()))?;
    auth.require_admin_or_creator(existing.criado_por)?;

    if !db::dashboards::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Dashboard not found".to_string()));
    }

    tracing::info!(dashboard_id = %id, user_id = %auth.user_id, "Dashboard deleted");

    Ok(Json(serde_json::json!({ "message": "Dashboard deleted" })))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn validate(d: &NewDashboard<'_>) -> Result<(), AppError> {
    if d.titulo.is_empty() {
        return Err(AppError::invalid("Title and iframe URL are required", "titulo"));
    }
    if d.url_iframe.is_empty() {
        return Err(AppError::invalid("Title and iframe URL are required", "url_iframe"));
    }
    if d.setor.is_empty() {
        return Err(AppError::invalid("Sector is required", "setor"));
    }

    let url_ok = Url::parse(d.url_iframe)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !url_ok {
        return Err(AppError::invalid(
            "Iframe URL must be an absolute http(s) URL",
            "url_iframe",
        ));
    }

    if !LARGURA_RANGE.contains(&d.largura) {
        return Err(AppError::invalid(
            format!(
                "Width must be between {} and {}",
                LARGURA_RANGE.start(),
                LARGURA_RANGE.end()
            ),
            "largura",
        ));
    }
    if !ALTURA_RANGE.contains(&d.altura) {
        return Err(AppError::invalid(
            format!(
                "Height must be between {} and {}",
                ALTURA_RANGE.start(),
                ALTURA_RANGE.end()
            ),
            "altura",
        ));
    }

    Ok(())
}
