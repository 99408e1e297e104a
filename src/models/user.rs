use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLE_USUARIO: &str = "usuario";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    #[serde(skip)]
    pub senha_hash: String,
    pub setor: String,
    pub tipo_usuario: String,
    pub email_verificado: bool,
    pub ultimo_login: Option<DateTime<Utc>>,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.tipo_usuario == ROLE_ADMIN
    }
}

/// Row of the organisational chart listing.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Colaborador {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    pub setor: String,
    pub tipo_usuario: String,
}
