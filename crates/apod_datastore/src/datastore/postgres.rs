use std::str::FromStr;

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{
    migrate::Migrator,
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, Connection, PgPool,
};

use crate::{
    datastore::{BulkInsertResult, DataStore, FailedInsert, InsertFailReason},
    ApodRecord,
};

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Clone)]
pub struct PgDataStore {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct ApodRow {
    date: NaiveDate,
    title: String,
    explanation: String,
    media_type: String,
    image_url: String,
}

impl From<ApodRow> for ApodRecord {
    fn from(row: ApodRow) -> Self {
        ApodRecord::new(
            row.date,
            row.title,
            row.explanation,
            row.media_type,
            row.image_url,
        )
    }
}

impl PgDataStore {
    /// Establish connection to `database_name` on the server at `server_url`,
    /// creating the database and the `apod_data` table if they do not exist.
    ///
    /// The pool holds a single connection which is reused for every query.
    pub async fn init(server_url: &str, database_name: &str) -> anyhow::Result<Self> {
        if !is_plain_identifier(database_name) {
            anyhow::bail!("Invalid database name: {database_name:?}");
        }

        let server_options = PgConnectOptions::from_str(server_url)
            .context("Failed to parse database connection URL")?;

        ensure_database(&server_options, database_name).await?;

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(server_options.database(database_name))
            .await
            .inspect_err(
                |e| tracing::error!(error = ?e, "Failed to establish connection to database"),
            )
            .context("Failed to connect to postgres database")?;

        MIGRATOR
            .run(&pool)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to run database migrations"))
            .context("Failed to run database migrations")?;

        Ok(PgDataStore { pool })
    }

    async fn insert_record(&self, record: &ApodRecord) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO apod_data (date, explanation, media_type, title, image_url)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.date)
        .bind(&record.explanation)
        .bind(&record.media_type)
        .bind(&record.title)
        .bind(&record.image_url)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => tx.commit().await,
            Err(e) => {
                // keep the insert error as the reason, not the rollback's
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(
                        error = ?rollback_err,
                        date = %record.date,
                        "Failed to roll back insert"
                    );
                }
                Err(e)
            }
        }
    }
}

/// Creates `database_name` when the server does not have it yet
async fn ensure_database(server_options: &PgConnectOptions, database_name: &str) -> anyhow::Result<()> {
    let mut conn = server_options
        .connect()
        .await
        .inspect_err(|e| tracing::error!(error = ?e, "Failed to connect to postgres server"))
        .context("Failed to connect to postgres server")?;

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)",
    )
    .bind(database_name)
    .fetch_one(&mut conn)
    .await
    .context("Failed to look up database")?;

    if !exists {
        // identifiers cannot be bound; the name was validated by the caller
        sqlx::query(&format!(r#"CREATE DATABASE "{database_name}""#))
            .execute(&mut conn)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, database_name, "Failed to create database"))
            .context("Failed to create database")?;
        tracing::info!(database_name, "Created database");
    }

    conn.close().await.context("Failed to close server connection")?;

    Ok(())
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.len() <= 63
}

impl DataStore for PgDataStore {
    #[tracing::instrument(skip_all, fields(count = records.len()))]
    async fn replace_records(&self, records: &[ApodRecord]) -> anyhow::Result<BulkInsertResult> {
        sqlx::query("TRUNCATE TABLE apod_data RESTART IDENTITY")
            .execute(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to clear apod_data"))
            .context("Failed to clear apod_data")?;

        let mut result = BulkInsertResult::default();

        for record in records {
            match self.insert_record(record).await {
                Ok(()) => result.successful_inserts += 1,
                Err(err) => {
                    tracing::error!(
                        error = ?err,
                        date = %record.date,
                        "Failed to insert record"
                    );
                    result.failed_inserts.push(FailedInsert {
                        date: record.date,
                        reason: InsertFailReason::Database {
                            message: err.to_string(),
                        },
                    });
                }
            }
        }

        Ok(result)
    }

    async fn list_dates(&self) -> anyhow::Result<Vec<NaiveDate>> {
        sqlx::query_scalar::<_, NaiveDate>(
            "SELECT DISTINCT date FROM apod_data WHERE date IS NOT NULL ORDER BY date",
        )
        .fetch_all(&self.pool)
        .await
        .inspect_err(|e| tracing::error!(error = ?e, "Failed to fetch stored dates"))
        .context("Failed to fetch stored dates")
    }

    async fn get_record(&self, date: NaiveDate) -> anyhow::Result<Option<ApodRecord>> {
        let row = sqlx::query_as::<_, ApodRow>(
            r#"
            SELECT date, title, explanation, media_type, image_url
            FROM apod_data
            WHERE date = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|e| tracing::error!(error = ?e, %date, "Failed to fetch record"))
        .context("Failed to fetch record")?;

        Ok(row.map(ApodRecord::from))
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("Closed database connection");
    }
}
