use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Colaborador, User};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    nome: &str,
    email: &str,
    senha_hash: &str,
    setor: &str,
    tipo_usuario: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO usuarios (nome, email, senha_hash, setor, tipo_usuario)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(nome)
    .bind(email)
    .bind(senha_hash)
    .bind(setor)
    .bind(tipo_usuario)
    .fetch_one(executor)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn mark_verified<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE usuarios SET email_verificado = true, atualizado_em = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(executor)
    .await
}

pub async fn touch_last_login(pool: &PgPool, id: Uuid) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE usuarios SET ultimo_login = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn update_password<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    senha_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE usuarios SET senha_hash = $2, atualizado_em = now() WHERE id = $1")
        .bind(id)
        .bind(senha_hash)
        .execute(executor)
        .await?;
    Ok(())
}

/// Verified collaborators for the organisational chart.
pub async fn list_colaboradores(pool: &PgPool) -> Result<Vec<Colaborador>, sqlx::Error> {
    sqlx::query_as::<_, Colaborador>(
        "SELECT id, nome, email, setor, tipo_usuario FROM usuarios
         WHERE email_verificado = true
         ORDER BY setor, nome",
    )
    .fetch_all(pool)
    .await
}

/// Removes accounts that never verified their email within `max_age_days`.
/// Their verification codes go with them through the foreign key cascade.
pub async fn delete_stale_unverified<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    max_age_days: i32,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM usuarios
         WHERE email_verificado = false
           AND criado_em < now() - make_interval(days => $1)",
    )
    .bind(max_age_days)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
