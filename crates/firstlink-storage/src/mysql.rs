use async_trait::async_trait;
use firstlink_core::repository::{
    NewRedirect, ReadRepository, RedirectId, RedirectRecord, RedirectSummary, Repository,
    ResolutionStore, Result,
};
use firstlink_core::{Slug, StorageError, VisitorId};
use jiff::Timestamp;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::debug;

const REDIRECTS_DDL: &str = include_str!("../ddl/mysql/redirects.sql");
const VISITS_DDL: &str = include_str!("../ddl/mysql/visits.sql");

/// MySQL implementation of the store contracts.
///
/// The first-use flip is a conditional `UPDATE` whose affected-row count
/// tells the caller whether it won. Visit ledger inserts rely on the
/// `(redirect_id, visitor_ip)` primary key, and the `ON DELETE CASCADE`
/// foreign key removes ledger rows with their redirect.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `redirects` and `visits` tables if they do not exist.
    pub async fn migrate(&self) -> Result<()> {
        for ddl in [REDIRECTS_DDL, VISITS_DDL] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        debug!("redirect schema is up to date");
        Ok(())
    }

    async fn ensure_exists(&self, id: RedirectId) -> Result<()> {
        let exists = sqlx::query("SELECT 1 FROM redirects WHERE id = ? LIMIT 1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .is_some();

        if exists {
            Ok(())
        } else {
            Err(StorageError::Missing(id.to_string()))
        }
    }
}

fn now_unix_seconds() -> i64 {
    Timestamp::now().as_second()
}

fn parse_created_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", seconds))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_foreign_key_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn record_from_row(row: &MySqlRow) -> Result<RedirectRecord> {
    let id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
    let slug: String = row.try_get("slug").map_err(map_sqlx_error)?;
    let first_url: String = row.try_get("first_url").map_err(map_sqlx_error)?;
    let next_url: String = row.try_get("next_url").map_err(map_sqlx_error)?;
    let first_used: bool = row.try_get("first_used").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

    Ok(RedirectRecord {
        id: RedirectId::new(id),
        slug: Slug::new_unchecked(slug),
        first_url,
        next_url,
        first_used,
        created_at: parse_created_at(created_at)?,
    })
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<RedirectRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, slug, first_url, next_url, first_used, created_at
            FROM redirects
            WHERE slug = ?
            LIMIT 1
            "#,
        )
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn get_by_id(&self, id: RedirectId) -> Result<Option<RedirectRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, slug, first_url, next_url, first_used, created_at
            FROM redirects
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn exists(&self, slug: &Slug) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM redirects
            WHERE slug = ?
            LIMIT 1
            "#,
        )
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert(&self, redirect: NewRedirect) -> Result<RedirectRecord> {
        let created_at = now_unix_seconds();

        let result = sqlx::query(
            r#"
            INSERT INTO redirects (slug, first_url, next_url, first_used, created_at)
            VALUES (?, ?, ?, FALSE, ?)
            "#,
        )
        .bind(redirect.slug.as_str())
        .bind(&redirect.first_url)
        .bind(&redirect.next_url)
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(RedirectRecord {
                id: RedirectId::new(done.last_insert_id()),
                slug: redirect.slug,
                first_url: redirect.first_url,
                next_url: redirect.next_url,
                first_used: false,
                created_at: parse_created_at(created_at)?,
            }),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(redirect.slug.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn delete(&self, id: RedirectId) -> Result<Option<RedirectRecord>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query(
            r#"
            SELECT id, slug, first_url, next_url, first_used, created_at
            FROM redirects
            WHERE id = ?
            FOR UPDATE
            "#,
        )
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let record = record_from_row(&row)?;

        sqlx::query("DELETE FROM redirects WHERE id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(Some(record))
    }

    async fn list(&self) -> Result<Vec<RedirectSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.slug, r.first_url, r.next_url, r.first_used, r.created_at,
                   COUNT(v.redirect_id) AS visit_count
            FROM redirects r
            LEFT JOIN visits v ON v.redirect_id = r.id
            GROUP BY r.id, r.slug, r.first_url, r.next_url, r.first_used, r.created_at
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| {
                let visit_count: i64 = row.try_get("visit_count").map_err(map_sqlx_error)?;
                Ok(RedirectSummary {
                    record: record_from_row(row)?,
                    visit_count: u64::try_from(visit_count).map_err(|_| {
                        StorageError::InvalidData(format!("negative visit count {visit_count}"))
                    })?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ResolutionStore for MySqlRepository {
    async fn mark_first_used(&self, id: RedirectId) -> Result<()> {
        let result = sqlx::query("UPDATE redirects SET first_used = TRUE WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        // Zero changed rows: already used, or deleted.
        if result.rows_affected() == 0 {
            self.ensure_exists(id).await?;
        }
        Ok(())
    }

    async fn claim_first_use(&self, id: RedirectId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE redirects
            SET first_used = TRUE
            WHERE id = ?
              AND first_used = FALSE
            "#,
        )
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }
        self.ensure_exists(id).await?;
        Ok(false)
    }

    async fn has_visited(&self, id: RedirectId, visitor: &VisitorId) -> Result<bool> {
        let visited = sqlx::query(
            r#"
            SELECT 1
            FROM visits
            WHERE redirect_id = ?
              AND visitor_ip = ?
            LIMIT 1
            "#,
        )
        .bind(id.get())
        .bind(visitor.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(visited)
    }

    async fn record_visit(&self, id: RedirectId, visitor: &VisitorId) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO visits (redirect_id, visitor_ip, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(id.get())
        .bind(visitor.as_str())
        .bind(now_unix_seconds())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(format!("{id}/{visitor}")))
            }
            Err(err) if is_foreign_key_violation(&err) => {
                Err(StorageError::Missing(id.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }
}
