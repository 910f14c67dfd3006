use sqlx::{postgres::PgConnectOptions, Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

/// Connection settings from the same `DB_*` variables the app reads.
///
/// `None` when `DB_HOST` is unset, callers skip in that case.
fn connect_options() -> Option<PgConnectOptions> {
    dotenvy::dotenv().ok();

    let host = std::env::var("DB_HOST").ok()?;
    let port = std::env::var("DB_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5432);
    let username = std::env::var("DB_USERNAME").unwrap_or_else(|_| "postgres".to_string());
    let password = std::env::var("DB_PASSWORD").unwrap_or_default();

    Some(
        PgConnectOptions::new()
            .host(&host)
            .port(port)
            .username(&username)
            .password(&password),
    )
}

/// Create a fresh, migrated database for a single test case.
pub async fn setup_database() -> Option<PgPool> {
    let Some(options) = connect_options() else {
        eprintln!("DB_HOST is not set, skipping postgres test");
        return None;
    };

    // Use a different database for each test case
    let db_name = Uuid::new_v4().to_string();

    let mut connection = PgConnection::connect_with(&options.clone().database("postgres"))
        .await
        .expect("Failed to connect to Postgres");

    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect_with(options.database(&db_name))
        .await
        .expect("Failed to connect to Postgres.");

    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    Some(connection_pool)
}
