mod common;

use std::process::Command;

use intranet::cleanup::CleanupError;
use sqlx::PgPool;
use uuid::Uuid;

async fn insert_user(pool: &PgPool, email: &str, verified: bool, age_days: i32) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO usuarios (nome, email, senha_hash, setor, email_verificado, criado_em)
         VALUES ('Teste', $1, 'x', 'RH', $2, now() - make_interval(days => $3))
         RETURNING id",
    )
    .bind(email)
    .bind(verified)
    .bind(age_days)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_code(pool: &PgPool, usuario_id: Uuid, token: &str, expires_in_minutes: i32, age_minutes: i32) {
    sqlx::query(
        "INSERT INTO verificacoes_email (usuario_id, token, tipo_token, expira_em, criado_em)
         VALUES ($1, $2, 'verificacao_email',
                 now() + make_interval(mins => $3),
                 now() - make_interval(mins => $4))",
    )
    .bind(usuario_id)
    .bind(token)
    .bind(expires_in_minutes)
    .bind(age_minutes)
    .execute(pool)
    .await
    .unwrap();
}

async fn count(pool: &PgPool, sql: &str) -> i64 {
    sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
}

#[tokio::test]
async fn cleanup_removes_expired_codes_only() {
    let (pool, db_name, _) = common::create_test_db().await;
    let user = insert_user(&pool, "a@empresa.com", false, 0).await;
    insert_code(&pool, user, "expired", -10, 120).await;
    insert_code(&pool, user, "live", 60, 0).await;

    let report = intranet::cleanup::run(&pool, 7).await.unwrap();
    assert_eq!(report.expired_codes_deleted, 1);

    let tokens: Vec<String> = sqlx::query_scalar("SELECT token FROM verificacoes_email")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(tokens, vec!["live".to_string()]);

    common::drop_test_db(pool, &db_name).await;
}

#[tokio::test]
async fn cleanup_removes_stale_unverified_accounts() {
    let (pool, db_name, _) = common::create_test_db().await;
    let stale = insert_user(&pool, "velho@empresa.com", false, 8).await;
    insert_user(&pool, "recente@empresa.com", false, 6).await;
    insert_user(&pool, "verificado@empresa.com", true, 30).await;
    insert_code(&pool, stale, "pending", 60, 0).await;

    let report = intranet::cleanup::run(&pool, 7).await.unwrap();
    assert_eq!(report.stale_users_deleted, 1);

    let mut emails: Vec<String> = sqlx::query_scalar("SELECT email FROM usuarios")
        .fetch_all(&pool)
        .await
        .unwrap();
    emails.sort();
    assert_eq!(emails, vec!["recente@empresa.com", "verificado@empresa.com"]);

    // Codes of removed accounts go with them
    assert_eq!(count(&pool, "SELECT count(*) FROM verificacoes_email").await, 0);

    common::drop_test_db(pool, &db_name).await;
}

#[tokio::test]
async fn cleanup_keeps_only_newest_active_code_per_user() {
    let (pool, db_name, _) = common::create_test_db().await;
    let user = insert_user(&pool, "a@empresa.com", false, 0).await;
    insert_code(&pool, user, "oldest", 60, 30).await;
    insert_code(&pool, user, "older", 60, 20).await;
    insert_code(&pool, user, "newest", 60, 1).await;

    let report = intranet::cleanup::run(&pool, 7).await.unwrap();
    assert_eq!(report.duplicate_codes_voided, 2);

    let active: Vec<String> =
        sqlx::query_scalar("SELECT token FROM verificacoes_email WHERE usado_em IS NULL")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(active, vec!["newest".to_string()]);

    // A second run has nothing left to do
    let report = intranet::cleanup::run(&pool, 7).await.unwrap();
    assert_eq!(report, intranet::cleanup::CleanupReport::default());

    common::drop_test_db(pool, &db_name).await;
}

#[tokio::test]
async fn cleanup_rejects_out_of_range_age() {
    let (pool, db_name, _) = common::create_test_db().await;
    insert_user(&pool, "recente@empresa.com", false, 0).await;

    let err = intranet::cleanup::run(&pool, 4_294_967_296).await.unwrap_err();
    assert!(matches!(err, CleanupError::InvalidMaxAge(4_294_967_296)));
    assert!(matches!(
        intranet::cleanup::run(&pool, 0).await,
        Err(CleanupError::InvalidMaxAge(0))
    ));

    assert_eq!(count(&pool, "SELECT count(*) FROM usuarios").await, 1);
    assert_eq!(intranet::cleanup::validate_max_age(7).unwrap(), 7);

    common::drop_test_db(pool, &db_name).await;
}

#[tokio::test]
async fn cleanup_failure_rolls_back_earlier_steps() {
    let (pool, db_name, _) = common::create_test_db().await;
    let user = insert_user(&pool, "a@empresa.com", true, 0).await;
    insert_code(&pool, user, "expired", -10, 120).await;
    insert_user(&pool, "velho@empresa.com", false, 8).await;

    // Make the stale-account step fail after expired codes were deleted
    sqlx::query(
        "CREATE FUNCTION block_user_delete() RETURNS trigger LANGUAGE plpgsql AS $$
         BEGIN RAISE EXCEPTION 'user deletes blocked'; END $$",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER block_user_delete BEFORE DELETE ON usuarios
         FOR EACH ROW EXECUTE FUNCTION block_user_delete()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let err = intranet::cleanup::run(&pool, 7).await.unwrap_err();
    assert!(matches!(err, CleanupError::Database(_)));

    assert_eq!(count(&pool, "SELECT count(*) FROM verificacoes_email").await, 1);
    assert_eq!(count(&pool, "SELECT count(*) FROM usuarios").await, 2);

    common::drop_test_db(pool, &db_name).await;
}

fn run_cleanup_binary(envs: &[(&str, &str)]) -> Option<i32> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_intranet-cleanup"));
    command.env_remove("INTRANET_CLEANUP_UNVERIFIED_DAYS");
    for (key, value) in envs {
        command.env(key, value);
    }
    command.status().expect("failed to run cleanup binary").code()
}

#[test]
fn cleanup_binary_exits_with_failure() {
    assert_eq!(
        run_cleanup_binary(&[("DATABASE_URL", "not a database url")]),
        Some(1)
    );
    assert_eq!(
        run_cleanup_binary(&[
            ("DATABASE_URL", "postgres://localhost/intranet"),
            ("INTRANET_CLEANUP_UNVERIFIED_DAYS", "4294967296"),
        ]),
        Some(1)
    );
}
