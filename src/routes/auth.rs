use std::sync::LazyLock;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{encode_token, Claims};
use crate::auth::{codes, password};
use crate::db;
use crate::email::Mailer;
use crate::error::AppError;
use crate::models::user::ROLE_USUARIO;
use crate::models::{CodeKind, User};
use crate::state::SharedState;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

const INVALID_CODE: &str = "Invalid or expired code";

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub setor: String,
}

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub codigo: String,
}

#[derive(Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub codigo: String,
    pub nova_senha: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
    pub verification_required: bool,
    pub email_enviado: bool,
}

#[derive(Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue_token(state: &SharedState, user: &User) -> Result<String, AppError> {
    let claims = Claims::new(
        user.id,
        user.tipo_usuario.clone(),
        state.config.token_ttl_hours,
    );
    encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)
}

/// Voids outstanding codes of the same kind and stores a fresh one. Returns the plain code.
async fn issue_code(
    conn: &mut sqlx::PgConnection,
    usuario_id: Uuid,
    kind: CodeKind,
) -> Result<String, sqlx::Error> {
    db::verification_codes::void_outstanding(&mut *conn, usuario_id, kind).await?;

    let code = codes::generate();
    db::verification_codes::create(
        &mut *conn,
        usuario_id,
        &codes::hash(&code),
        kind,
        Utc::now() + kind.ttl(),
    )
    .await?;

    Ok(code)
}

/// Consumes a valid code of `kind` for `usuario_id` inside the caller's transaction.
/// Returns false when the code is wrong, expired or already used.
async fn consume_code(
    conn: &mut sqlx::PgConnection,
    usuario_id: Uuid,
    codigo: &str,
    kind: CodeKind,
) -> Result<bool, sqlx::Error> {
    let Some(code) =
        db::verification_codes::find_valid(&mut *conn, usuario_id, &codes::hash(codigo), kind)
            .await?
    else {
        return Ok(false);
    };

    db::verification_codes::mark_used(&mut *conn, code.id).await
}

fn code_key(kind: CodeKind, email: &str) -> String {
    format!("{}:{email}", kind.as_str())
}

fn check_code_attempts(state: &SharedState, kind: CodeKind, email: &str) -> Result<(), AppError> {
    state
        .code_limiter
        .check(&code_key(kind, email))
        .map_err(|wait| {
            AppError::RateLimited(format!(
                "Too many wrong codes. Request a new code in {wait} seconds"
            ))
        })
}

/// Counts a wrong code. Hitting the limit voids every outstanding code of that kind.
async fn wrong_code(
    state: &SharedState,
    usuario_id: Option<Uuid>,
    kind: CodeKind,
    email: &str,
) -> AppError {
    if !state.code_limiter.record_failure(&code_key(kind, email)) {
        return AppError::BadRequest(INVALID_CODE.to_string());
    }

    if let Some(usuario_id) = usuario_id {
        match db::verification_codes::void_outstanding(&state.pool, usuario_id, kind).await {
            Ok(voided) => tracing::warn!(
                user_id = %usuario_id,
                kind = kind.as_str(),
                voided,
                "Too many wrong codes, outstanding codes voided"
            ),
            Err(e) => return AppError::Database(e),
        }
    }

    AppError::RateLimited("Too many wrong codes. Request a new code later.".to_string())
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let nome = req.nome.trim();
    let setor = req.setor.trim();
    let email = normalize_email(&req.email);

    if nome.is_empty() || email.is_empty() || req.senha.is_empty() || setor.is_empty() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }
    if !EMAIL_RE.is_match(&email) {
        return Err(AppError::invalid("Invalid email address", "email"));
    }
    password::check_length(&req.senha).map_err(|e| AppError::invalid(e, "senha"))?;

    let senha_hash = password::hash(&req.senha).map_err(AppError::Internal)?;

    let mut tx = state.pool.begin().await?;
    let user = db::users::create(&mut *tx, nome, &email, &senha_hash, setor, ROLE_USUARIO)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Email already registered".to_string())
            }
            _ => AppError::Database(e),
        })?;
    let code = issue_code(&mut tx, user.id, CodeKind::VerificacaoEmail).await?;
    tx.commit().await?;

    // Space out the first resend from the registration email.
    let _ = state.resend_cooldown.try_acquire(&email);

    let email_enviado = match state
        .mailer
        .send_verification_code(&user.email, &user.nome, &code)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to send verification email to {}: {e}", user.email);
            state.resend_cooldown.release(&email);
            false
        }
    };

    tracing::info!(user_id = %user.id, "User registered, awaiting email verification");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful. Check your email for the verification code."
                .to_string(),
            user,
            verification_required: true,
            email_enviado,
        }),
    ))
}

pub async fn verify_email(
    State(state): State<SharedState>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if !codes::is_well_formed(&req.codigo) {
        return Err(AppError::invalid("The code must have 6 digits", "codigo"));
    }

    let email = normalize_email(&req.email);
    let kind = CodeKind::VerificacaoEmail;
    check_code_attempts(&state, kind, &email)?;

    let Some(user) = db::users::find_by_email(&state.pool, &email).await? else {
        return Err(wrong_code(&state, None, kind, &email).await);
    };

    if user.email_verificado {
        return Err(AppError::Conflict("Email already verified".to_string()));
    }

    let mut tx = state.pool.begin().await?;
    if !consume_code(&mut tx, user.id, &req.codigo, kind).await? {
        tx.rollback().await?;
        return Err(wrong_code(&state, Some(user.id), kind, &email).await);
    }
    let user = db::users::mark_verified(&mut *tx, user.id).await?;
    tx.commit().await?;

    state.code_limiter.reset(&code_key(kind, &email));

    let user = db::users::touch_last_login(&state.pool, user.id).await?;
    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = %user.id, "Email verified");

    Ok(Json(AuthResponse {
        message: "Email verified successfully".to_string(),
        token,
        user,
    }))
}

pub async fn resend_verification(
    State(state): State<SharedState>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = normalize_email(&req.email);

    let user = db::users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    if user.email_verificado {
        return Err(AppError::Conflict("Email already verified".to_string()));
    }

    if let Err(wait) = state.resend_cooldown.try_acquire(&email) {
        return Err(AppError::RateLimited(format!(
            "Wait {wait} seconds before requesting a new code"
        )));
    }

    let mut tx = state.pool.begin().await?;
    let code = issue_code(&mut tx, user.id, CodeKind::VerificacaoEmail).await?;
    tx.commit().await?;

    if let Err(e) = state
        .mailer
        .send_verification_code(&user.email, &user.nome, &code)
        .await
    {
        state.resend_cooldown.release(&email);
        return Err(AppError::Internal(format!(
            "Failed to send verification email: {e}"
        )));
    }

    Ok(Json(MessageResponse {
        message: "A new code was sent to your email".to_string(),
    }))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&req.email);

    if state.login_limiter.check(&email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let Some(user) = db::users::find_by_email(&state.pool, &email).await? else {
        state.login_limiter.record_failure(&email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    let valid = password::verify(&req.senha, &user.senha_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record_failure(&email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    if !user.email_verificado {
        return Err(AppError::Forbidden("Email not verified".to_string()));
    }

    state.login_limiter.reset(&email);

    let user = db::users::touch_last_login(&state.pool, user.id).await?;
    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

pub async fn profile(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    Ok(Json(ProfileResponse { user }))
}

pub async fn request_reset_code(
    State(state): State<SharedState>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    // Same answer for known and unknown emails
    let response = Json(MessageResponse {
        message: "If that email is registered, a reset code has been sent.".to_string(),
    });

    let email = normalize_email(&req.email);

    // Applied whether or not the account exists
    if let Err(wait) = state.reset_cooldown.try_acquire(&email) {
        return Err(AppError::RateLimited(format!(
            "Wait {wait} seconds before requesting a new code"
        )));
    }

    let task_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) =
            send_reset_code(&task_state.pool, task_state.mailer.as_ref(), &email).await
        {
            task_state.reset_cooldown.release(&email);
            tracing::error!("Password reset for {email} failed: {e}");
        }
    });

    Ok(response)
}

async fn send_reset_code(
    pool: &sqlx::PgPool,
    mailer: &dyn Mailer,
    email: &str,
) -> Result<(), String> {
    let Some(user) = db::users::find_by_email(pool, email)
        .await
        .map_err(|e| format!("lookup: {e}"))?
    else {
        return Ok(());
    };

    let mut tx = pool.begin().await.map_err(|e| format!("begin: {e}"))?;
    let code = issue_code(&mut tx, user.id, CodeKind::ResetSenha)
        .await
        .map_err(|e| format!("store code: {e}"))?;
    tx.commit().await.map_err(|e| format!("commit: {e}"))?;

    mailer
        .send_password_reset_code(&user.email, &user.nome, &code)
        .await
}

pub async fn reset_password_with_code(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    password::check_length(&req.nova_senha).map_err(|e| AppError::invalid(e, "nova_senha"))?;
    if !codes::is_well_formed(&req.codigo) {
        return Err(AppError::invalid("The code must have 6 digits", "codigo"));
    }

    let email = normalize_email(&req.email);
    let kind = CodeKind::ResetSenha;
    check_code_attempts(&state, kind, &email)?;

    let Some(user) = db::users::find_by_email(&state.pool, &email).await? else {
        return Err(wrong_code(&state, None, kind, &email).await);
    };

    let senha_hash = password::hash(&req.nova_senha).map_err(AppError::Internal)?;

    let mut tx = state.pool.begin().await?;
    if !consume_code(&mut tx, user.id, &req.codigo, kind).await? {
        tx.rollback().await?;
        return Err(wrong_code(&state, Some(user.id), kind, &email).await);
    }
    db::users::update_password(&mut *tx, user.id, &senha_hash).await?;
    tx.commit().await?;

    state.code_limiter.reset(&code_key(kind, &email));
    state.login_limiter.reset(&user.email);
    tracing::info!(user_id = %user.id, "Password reset with code");

    Ok(Json(MessageResponse {
        message: "Password reset successfully".to_string(),
    }))
}
