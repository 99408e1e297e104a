use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeKind {
    VerificacaoEmail,
    ResetSenha,
}

impl CodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeKind::VerificacaoEmail => "verificacao_email",
            CodeKind::ResetSenha => "reset_senha",
        }
    }

    /// How long a freshly issued code stays valid.
    pub fn ttl(&self) -> chrono::Duration {
        match self {
            CodeKind::VerificacaoEmail => chrono::Duration::hours(24),
            CodeKind::ResetSenha => chrono::Duration::hours(1),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct VerificationCode {
    pub id: Uuid,
    pub usuario_id: Uuid,
    #[serde(skip_serializing)]
    pub token: String,
    pub tipo_token: String,
    pub expira_em: DateTime<Utc>,
    pub usado_em: Option<DateTime<Utc>>,
    pub criado_em: DateTime<Utc>,
}
