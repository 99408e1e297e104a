#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use intranet::config::{Config, Environment};
use intranet::email::Mailer;

pub const PASSWORD: &str = "segredo123";

/// One email the app tried to send.
#[derive(Debug, Clone)]
pub struct SentCode {
    pub to: String,
    pub code: String,
    pub reset: bool,
}

/// Mailer that records codes instead of sending them. Can be switched to fail.
#[derive(Default)]
pub struct CapturingMailer {
    sent: Mutex<Vec<SentCode>>,
    failing: AtomicBool,
}

impl CapturingMailer {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentCode> {
        self.sent.lock().unwrap().clone()
    }

    /// Latest code sent to `email`, verification or reset.
    pub fn last_code(&self, email: &str, reset: bool) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.to == email && s.reset == reset)
            .map(|s| s.code.clone())
    }

    fn record(&self, to: &str, code: &str, reset: bool) -> Result<(), String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("smtp unavailable".to_string());
        }
        self.sent.lock().unwrap().push(SentCode {
            to: to.to_string(),
            code: code.to_string(),
            reset,
        });
        Ok(())
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send_verification_code(&self, to_email: &str, _to_name: &str, code: &str)
        -> Result<(), String> {
        self.record(to_email, code, false)
    }

    async fn send_password_reset_code(&self, to_email: &str, _to_name: &str, code: &str)
        -> Result<(), String> {
        self.record(to_email, code, true)
    }
}

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub mailer: Arc<CapturingMailer>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn register(&self, nome: &str, email: &str, senha: &str, setor: &str) -> (Value, StatusCode) {
        self.post_json(
            "/api/auth/register",
            &json!({ "nome": nome, "email": email, "senha": senha, "setor": setor }),
        )
        .await
    }

    pub async fn verify_email(&self, email: &str, codigo: &str) -> (Value, StatusCode) {
        self.post_json(
            "/api/auth/verify-email",
            &json!({ "email": email, "codigo": codigo }),
        )
        .await
    }

    pub async fn login(&self, email: &str, senha: &str) -> (Value, StatusCode) {
        self.post_json("/api/auth/login", &json!({ "email": email, "senha": senha }))
            .await
    }

    /// Register and verify a user, return (token, user JSON).
    pub async fn verified_user(&self, nome: &str, email: &str, setor: &str) -> (String, Value) {
        let (body, status) = self.register(nome, email, PASSWORD, setor).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        let code = self
            .mailer
            .last_code(email, false)
            .expect("no verification code captured");
        let (body, status) = self.verify_email(email, &code).await;
        assert_eq!(status, StatusCode::OK, "verify failed: {body}");

        (
            body["token"].as_str().unwrap().to_string(),
            body["user"].clone(),
        )
    }

    /// Verified user promoted to admin. Logs in again so the token carries the role.
    pub async fn admin(&self, email: &str) -> (String, Value) {
        self.verified_user("Admin", email, "TI").await;
        sqlx::query("UPDATE usuarios SET tipo_usuario = 'admin' WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .expect("promote to admin failed");

        let (body, status) = self.login(email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"].clone(),
        )
    }

    /// Create a dashboard as `token`, return the dashboard JSON.
    pub async fn create_dashboard(&self, token: &str, titulo: &str, setor: &str) -> Value {
        let (body, status) = self
            .post_auth(
                "/api/dashboards",
                token,
                &json!({
                    "titulo": titulo,
                    "setor": setor,
                    "url_iframe": "https://app.powerbi.com/view?r=abc",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create dashboard failed: {body}");
        body["dashboard"].clone()
    }

    /// Reset codes are sent from a background task; poll until one shows up.
    pub async fn wait_for_reset_code(&self, email: &str) -> Option<String> {
        for _ in 0..50 {
            if let Some(code) = self.mailer.last_code(email, true) {
                return Some(code);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        None
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

fn database_url_for(base_url: &str, db_name: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Create a fresh temporary database with migrations applied.
pub async fn create_test_db() -> (PgPool, String, String) {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let db_name = format!("intranet_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url_for(&base_url, "postgres"))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = database_url_for(&base_url, &db_name);
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    (pool, db_name, test_url)
}

/// Spawn a test app with a fresh temporary database and no resend cooldown.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let (pool, db_name, test_url) = create_test_db().await;

    let mut config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        environment: Environment::Development,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:0".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        token_ttl_hours: 24,
        resend_cooldown_secs: 0,
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
        smtp: None,
    };
    configure(&mut config);

    let mailer = Arc::new(CapturingMailer::default());
    let (app, _state) = intranet::build_app(pool.clone(), config, mailer.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
        mailer,
    }
}

/// Drop a test database by name.
pub async fn drop_test_db(pool: PgPool, db_name: &str) {
    pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url_for(&base_url, "postgres"))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    drop_test_db(app.pool, &db_name).await;
}
