use anyhow::{Context, Result};
use log::{info, warn};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::fmt;

use crate::models::Employer;

/// Opens the store with a single connection; each run is strictly sequential.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    info!("Connecting to database at {}", database_url);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to {}", database_url))
}

#[derive(Debug, PartialEq, Eq)]
pub enum ArchiveOutcome {
    NoEmployers,
    Archived {
        employer_id: String,
        archived_count: i64,
    },
}

impl fmt::Display for ArchiveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveOutcome::NoEmployers => write!(f, "No employers found"),
            ArchiveOutcome::Archived {
                employer_id,
                archived_count,
            } => {
                writeln!(f, "Archived count: {}", archived_count)?;
                write!(f, "Archived employer ID: {}", employer_id)
            }
        }
    }
}

pub struct ArchiveService {
    pool: SqlitePool,
}

impl ArchiveService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Archives whichever employer the store returns first, then reports the
    /// total number of archived employers.
    ///
    /// `archived_at_ms` never moves an existing timestamp backwards.
    pub async fn archive_first_employer(&self, archived_at_ms: i64) -> Result<ArchiveOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start archive transaction")?;

        let employer_id: Option<String> =
            sqlx::query_scalar("SELECT id FROM employers LIMIT 1")
                .fetch_optional(&mut *tx)
                .await?;

        let Some(employer_id) = employer_id else {
            info!("Employers table is empty, nothing to archive");
            return Ok(ArchiveOutcome::NoEmployers);
        };

        info!("Archiving employer {}", employer_id);
        sqlx::query(
            r#"
            UPDATE employers
            SET archived = 1,
                archived_at = MAX(COALESCE(archived_at, 0), ?)
            WHERE id = ?
            "#,
        )
        .bind(archived_at_ms)
        .bind(&employer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.context("Failed to commit archive")?;

        self.verify_archived(&employer_id).await;

        let archived_count = self.count_archived().await?;
        Ok(ArchiveOutcome::Archived {
            employer_id,
            archived_count,
        })
    }

    pub async fn count_archived(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM employers WHERE archived = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn find_employer(&self, id: &str) -> Result<Option<Employer>> {
        let employer = sqlx::query_as::<_, Employer>(
            r#"
            SELECT id, COALESCE(archived, 0) AS archived, archived_at
            FROM employers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employer)
    }

    /// Read-back check after the commit. Only logs; the write already stands.
    async fn verify_archived(&self, id: &str) {
        match self.find_employer(id).await {
            Ok(Some(employer)) if employer.archived => {
                let at = employer
                    .archived_at_utc()
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "unknown".to_string());
                info!("Employer {} archived at {}", employer.id, at);
            }
            Ok(Some(employer)) => warn!("Employer {} did not read back as archived", employer.id),
            Ok(None) => warn!("Employer {} disappeared after archiving", id),
            Err(e) => warn!("Could not read back employer {}: {:#}", id, e),
        }
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// One full run: archive, then close the pool whether or not the archive
    /// succeeded.
    pub async fn run_once(self, archived_at_ms: i64) -> Result<ArchiveOutcome> {
        let result = self.archive_first_employer(archived_at_ms).await;
        self.close().await;
        result
    }
}
