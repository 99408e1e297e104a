use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::Colaborador;
use crate::state::SharedState;

#[derive(Serialize)]
pub struct ColaboradoresResponse {
    pub colaboradores: Vec<Colaborador>,
}

pub async fn list_colaboradores(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ColaboradoresResponse>, AppError> {
    let colaboradores = db::users::list_colaboradores(&state.pool).await?;
    Ok(Json(ColaboradoresResponse { colaboradores }))
}
