use serde::Deserialize;

use super::api::ApiClient;
use super::error::ClientError;
use crate::models::Colaborador;

#[derive(Deserialize)]
struct ColaboradoresPayload {
    #[serde(default)]
    colaboradores: Vec<Colaborador>,
}

pub async fn list_colaboradores(api: &ApiClient) -> Result<Vec<Colaborador>, ClientError> {
    let payload: ColaboradoresPayload = api.get("/api/organograma/colaboradores").await?;
    Ok(payload.colaboradores)
}
