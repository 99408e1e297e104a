use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{CodeKind, VerificationCode};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    usuario_id: Uuid,
    token_hash: &str,
    kind: CodeKind,
    expira_em: DateTime<Utc>,
) -> Result<VerificationCode, sqlx::Error> {
    sqlx::query_as::<_, VerificationCode>(
        "INSERT INTO verificacoes_email (usuario_id, token, tipo_token, expira_em)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(usuario_id)
    .bind(token_hash)
    .bind(kind.as_str())
    .bind(expira_em)
    .fetch_one(executor)
    .await
}

pub async fn find_valid<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    usuario_id: Uuid,
    token_hash: &str,
    kind: CodeKind,
) -> Result<Option<VerificationCode>, sqlx::Error> {
    sqlx::query_as::<_, VerificationCode>(
        "SELECT * FROM verificacoes_email
         WHERE usuario_id = $1 AND token = $2 AND tipo_token = $3
           AND usado_em IS NULL AND expira_em > now()
         ORDER BY criado_em DESC
         LIMIT 1",
    )
    .bind(usuario_id)
    .bind(token_hash)
    .bind(kind.as_str())
    .fetch_optional(executor)
    .await
}

/// Marks a code used. Returns false when another request consumed it first.
pub async fn mark_used<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE verificacoes_email SET usado_em = now() WHERE id = $1 AND usado_em IS NULL",
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Voids every outstanding code of a kind, used before issuing a new one.
pub async fn void_outstanding<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    usuario_id: Uuid,
    kind: CodeKind,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE verificacoes_email SET usado_em = now()
         WHERE usuario_id = $1 AND tipo_token = $2 AND usado_em IS NULL",
    )
    .bind(usuario_id)
    .bind(kind.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_expired<'e, E: sqlx::PgExecutor<'e>>(executor: E) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM verificacoes_email WHERE expira_em < now()")
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Keeps only the newest active verification code per user.
pub async fn void_duplicates<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE verificacoes_email v SET usado_em = now()
         WHERE v.tipo_token = 'verificacao_email'
           AND v.usado_em IS NULL
           AND v.expira_em > now()
           AND EXISTS (
               SELECT 1 FROM verificacoes_email newer
               WHERE newer.usuario_id = v.usuario_id
                 AND newer.tipo_token = 'verificacao_email'
                 AND newer.usado_em IS NULL
                 AND newer.expira_em > now()
                 AND (newer.criado_em, newer.id) > (v.criado_em, v.id)
           )",
    )
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
