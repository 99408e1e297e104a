use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_LARGURA: i32 = 1200;
pub const DEFAULT_ALTURA: i32 = 600;
pub const LARGURA_RANGE: std::ops::RangeInclusive<i32> = 600..=2000;
pub const ALTURA_RANGE: std::ops::RangeInclusive<i32> = 400..=1200;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub id: Uuid,
    pub titulo: String,
    pub descricao: Option<String>,
    pub setor: String,
    pub url_iframe: String,
    pub ativo: bool,
    pub largura: i32,
    pub altura: i32,
    pub criado_por: Option<Uuid>,
    /// Only present on reads that join the creator.
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criado_por_nome: Option<String>,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}
