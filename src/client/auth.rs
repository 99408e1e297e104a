use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::api::{ApiClient, AuthMode};
use super::error::ClientError;
use crate::models::User;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    pub message: String,
    pub user: User,
    pub verification_required: bool,
    #[serde(default)]
    pub email_enviado: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub setor: String,
}

#[derive(Deserialize)]
struct ProfilePayload {
    user: User,
}

/// Calls under `/api/auth`.
pub struct AuthApi<'a> {
    api: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn profile(&self) -> Result<User, ClientError> {
        let payload: ProfilePayload = self.api.get("/api/auth/profile").await?;
        Ok(payload.user)
    }

    pub async fn login(&self, email: &str, senha: &str) -> Result<AuthPayload, ClientError> {
        self.api
            .send_json(
                Method::POST,
                "/api/auth/login",
                &serde_json::json!({ "email": email, "senha": senha }),
                AuthMode::Public,
            )
            .await
    }

    pub async fn register(&self, registration: &Registration) -> Result<RegisterPayload, ClientError> {
        self.api
            .send_json(Method::POST, "/api/auth/register", registration, AuthMode::Public)
            .await
    }

    pub async fn verify_email(&self, email: &str, codigo: &str) -> Result<AuthPayload, ClientError> {
        let codigo = codigo.trim();
        if codigo.len() != 6 || !codigo.chars().all(|c| c.is_ascii_digit()) {
            return Err(ClientError::Invalid("The code must have 6 digits".to_string()));
        }
        self.api
            .send_json(
                Method::POST,
                "/api/auth/verify-email",
                &serde_json::json!({ "email": email, "codigo": codigo }),
                AuthMode::Public,
            )
            .await
    }

    pub async fn resend_verification(&self, email: &str) -> Result<MessagePayload, ClientError> {
        self.api
            .send_json(
                Method::POST,
                "/api/auth/resend-verification",
                &serde_json::json!({ "email": email }),
                AuthMode::Public,
            )
            .await
    }

    pub async fn request_reset_code(&self, email: &str) -> Result<MessagePayload, ClientError> {
        self.api
            .send_json(
                Method::POST,
                "/api/auth/request-reset-code",
                &serde_json::json!({ "email": email.trim() }),
                AuthMode::Public,
            )
            .await
    }

    pub async fn reset_password_with_code(
        &self,
        email: &str,
        codigo: &str,
        nova_senha: &str,
    ) -> Result<MessagePayload, ClientError> {
        self.api
            .send_json(
                Method::POST,
                "/api/auth/reset-password-with-code",
                &serde_json::json!({ "email": email, "codigo": codigo, "nova_senha": nova_senha }),
                AuthMode::Public,
            )
            .await
    }
}
