use reqwest::Method;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::api::{ApiClient, AuthMode};
use super::error::ClientError;
use crate::models::dashboard::{ALTURA_RANGE, DEFAULT_ALTURA, DEFAULT_LARGURA, LARGURA_RANGE};
use crate::models::Dashboard;

/// Editable fields of a dashboard as a form holds them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardForm {
    pub titulo: String,
    pub descricao: Option<String>,
    pub setor: String,
    pub url_iframe: String,
    pub ativo: bool,
    pub largura: Option<i32>,
    pub altura: Option<i32>,
}

impl DashboardForm {
    pub fn new(titulo: &str, setor: &str, url_iframe: &str) -> Self {
        Self {
            titulo: titulo.to_string(),
            descricao: None,
            setor: setor.to_string(),
            url_iframe: url_iframe.to_string(),
            ativo: true,
            largura: Some(DEFAULT_LARGURA),
            altura: Some(DEFAULT_ALTURA),
        }
    }

    pub fn from_dashboard(dashboard: &Dashboard) -> Self {
        Self {
            titulo: dashboard.titulo.clone(),
            descricao: dashboard.descricao.clone(),
            setor: dashboard.setor.clone(),
            url_iframe: dashboard.url_iframe.clone(),
            ativo: dashboard.ativo,
            largura: Some(dashboard.largura),
            altura: Some(dashboard.altura),
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.titulo.trim().is_empty() || self.url_iframe.trim().is_empty() {
            return Err(ClientError::Invalid(
                "Title and iframe URL are required".to_string(),
            ));
        }
        if self.setor.trim().is_empty() {
            return Err(ClientError::Invalid("Sector is required".to_string()));
        }
        Ok(())
    }

    /// Trimmed copy with out-of-range or missing dimensions reset to 1200x600.
    pub fn normalized(&self) -> Self {
        let largura = self
            .largura
            .filter(|l| LARGURA_RANGE.contains(l))
            .unwrap_or(DEFAULT_LARGURA);
        let altura = self
            .altura
            .filter(|a| ALTURA_RANGE.contains(a))
            .unwrap_or(DEFAULT_ALTURA);

        Self {
            titulo: self.titulo.trim().to_string(),
            descricao: self
                .descricao
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            setor: self.setor.trim().to_string(),
            url_iframe: self.url_iframe.trim().to_string(),
            ativo: self.ativo,
            largura: Some(largura),
            altura: Some(altura),
        }
    }
}

#[derive(Deserialize)]
struct DashboardsPayload {
    #[serde(default)]
    dashboards: Vec<Dashboard>,
}

#[derive(Deserialize)]
struct DashboardPayload {
    dashboard: Dashboard,
}

/// CRUD over `/api/dashboards`.
pub struct DashboardService<'a> {
    api: &'a ApiClient,
}

impl<'a> DashboardService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, setor: Option<&str>) -> Result<Vec<Dashboard>, ClientError> {
        let payload: DashboardsPayload = match setor {
            Some(setor) => {
                self.api
                    .get_with_query("/api/dashboards", &[("setor", setor)])
                    .await?
            }
            None => self.api.get("/api/dashboards").await?,
        };
        Ok(payload.dashboards)
    }

    pub async fn create(&self, form: &DashboardForm) -> Result<Dashboard, ClientError> {
        form.validate()?;
        let payload: DashboardPayload = self
            .api
            .send_json(
                Method::POST,
                "/api/dashboards",
                &form.normalized(),
                AuthMode::Required,
            )
            .await?;
        Ok(payload.dashboard)
    }

    pub async fn update(&self, id: Uuid, form: &DashboardForm) -> Result<Dashboard, ClientError> {
        form.validate()?;
        let mut body = form.normalized();
        // The API reads an empty description as "clear it".
        if body.descricao.is_none() {
            body.descricao = Some(String::new());
        }
        let payload: DashboardPayload = self
            .api
            .send_json(
                Method::PUT,
                &format!("/api/dashboards/{id}"),
                &body,
                AuthMode::Required,
            )
            .await?;
        Ok(payload.dashboard)
    }

    pub async fn set_active(&self, id: Uuid, ativo: bool) -> Result<Dashboard, ClientError> {
        let payload: DashboardPayload = self
            .api
            .send_json(
                Method::PUT,
                &format!("/api/dashboards/{id}"),
                &serde_json::json!({ "ativo": ativo }),
                AuthMode::Required,
            )
            .await?;
        Ok(payload.dashboard)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        let _: IgnoredAny = self.api.delete(&format!("/api/dashboards/{id}")).await?;
        Ok(())
    }
}

/// Active dashboards, optionally restricted to one sector.
pub fn filter_active<'d>(dashboards: &'d [Dashboard], setor: Option<&str>) -> Vec<&'d Dashboard> {
    dashboards
        .iter()
        .filter(|d| d.ativo)
        .filter(|d| setor.is_none_or(|s| d.setor == s))
        .collect()
}

/// Distinct sectors in first-seen order.
pub fn sectors(dashboards: &[Dashboard]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for d in dashboards {
        if !seen.contains(&d.setor) {
            seen.push(d.setor.clone());
        }
    }
    seen
}
