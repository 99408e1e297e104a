use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Dashboard;

const SELECT_WITH_CREATOR: &str = "SELECT d.*, u.nome AS criado_por_nome
     FROM dashboards d
     LEFT JOIN usuarios u ON u.id = d.criado_por";

pub struct NewDashboard<'a> {
    pub titulo: &'a str,
    pub descricao: Option<&'a str>,
    pub setor: &'a str,
    pub url_iframe: &'a str,
    pub ativo: bool,
    pub largura: i32,
    pub altura: i32,
}

pub async fn list(
    pool: &PgPool,
    setor: Option<&str>,
    include_inactive: bool,
) -> Result<Vec<Dashboard>, sqlx::Error> {
    sqlx::query_as::<_, Dashboard>(&format!(
        "{SELECT_WITH_CREATOR}
         WHERE ($1::text IS NULL OR d.setor = $1)
           AND ($2 OR d.ativo)
         ORDER BY d.setor, d.titulo"
    ))
    .bind(setor)
    .bind(include_inactive)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Dashboard>, sqlx::Error> {
    sqlx::query_as::<_, Dashboard>(&format!("{SELECT_WITH_CREATOR} WHERE d.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    new: &NewDashboard<'_>,
    criado_por: Uuid,
) -> Result<Dashboard, sqlx::Error> {
    sqlx::query_as::<_, Dashboard>(
        "INSERT INTO dashboards
            (titulo, descricao, setor, url_iframe, ativo, largura, altura, criado_por)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(new.titulo)
    .bind(new.descricao)
    .bind(new.setor)
    .bind(new.url_iframe)
    .bind(new.ativo)
    .bind(new.largura)
    .bind(new.altura)
    .bind(criado_por)
    .fetch_one(pool)
    .await
}

/// Full replacement of the editable columns; callers merge partial updates first.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &NewDashboard<'_>,
) -> Result<Dashboard, sqlx::Error> {
    sqlx::query_as::<_, Dashboard>(
        "UPDATE dashboards
         SET titulo = $2, descricao = $3, setor = $4, url_iframe = $5,
             ativo = $6, largura = $7, altura = $8, atualizado_em = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(changes.titulo)
    .bind(changes.descricao)
    .bind(changes.setor)
    .bind(changes.url_iframe)
    .bind(changes.ativo)
    .bind(changes.largura)
    .bind(changes.altura)
    .fetch_one(pool)
    .await
}

/// Returns whether a row was removed.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM dashboards WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
