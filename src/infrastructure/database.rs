use crate::entities::{audit_entries, file_records, share_grants};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema, Statement};
use std::time::Duration;
use tracing::info;

pub async fn setup_database(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", database_url);

    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

/// Creates the three record stores. Deliberately no foreign keys between
/// them: each collection fails independently and nothing is transactional
/// across them.
pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let stmts = vec![
        schema
            .create_table_from_entity(file_records::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(share_grants::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(audit_entries::Entity)
            .if_not_exists()
            .to_owned(),
    ];

    for stmt in stmts {
        let stmt = builder.build(&stmt);
        db.execute(stmt).await?;
    }

    // Lookup paths: owner listings, grantee listings, per-actor trails.
    let _ = db
        .execute(Statement::from_string(
            builder,
            "CREATE INDEX IF NOT EXISTS idx_file_records_owner ON file_records(owner_id, created_at);"
                .to_string(),
        ))
        .await;
    let _ = db
        .execute(Statement::from_string(
            builder,
            "CREATE INDEX IF NOT EXISTS idx_share_grants_grantee ON share_grants(grantee_email);"
                .to_string(),
        ))
        .await;
    let _ = db
        .execute(Statement::from_string(
            builder,
            "CREATE INDEX IF NOT EXISTS idx_audit_entries_actor ON audit_entries(actor_id, timestamp);"
                .to_string(),
        ))
        .await;

    Ok(())
}
