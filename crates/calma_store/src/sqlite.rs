use anyhow::{Context, Result};
use async_trait::async_trait;
use calma_core::{
    AuthStore, CheckIn, Experience, Feeling, FeelingCount, HistoryStore, MoodSummary,
    RelaxationSession, Severity,
};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::path::Path;
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display());
        let pool = SqlitePoolOptions::new()
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON").execute(conn).await?;
                    Ok(())
                })
            })
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create users table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS login_tokens (
                token TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                used INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create login_tokens table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES users(id)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create api_sessions table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS check_ins (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                feeling TEXT NOT NULL,
                severity INTEGER NOT NULL,
                note TEXT,
                created_at INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES users(id)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create check_ins table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS relaxation_sessions (
                id TEXT PRIMARY KEY,
                check_in_id TEXT NOT NULL,
                experience_json TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                completed_at INTEGER,
                FOREIGN KEY(check_in_id) REFERENCES check_ins(id)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create relaxation_sessions table")?;

        // Index for the history query (per-user, newest first)
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_check_ins_user_created ON check_ins(user_id, created_at)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create check_ins index")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sessions_check_in ON relaxation_sessions(check_in_id)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create relaxation_sessions index")?;

        Ok(())
    }
}

/// Columns shared by every session-fetching query, in fixed order.
const SESSION_COLUMNS: &str = "s.id, s.experience_json, s.created_at, s.completed_at, \
     c.id AS check_in_id, c.user_id, c.feeling, c.severity, c.note, \
     c.created_at AS check_in_created_at";

fn session_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<RelaxationSession> {
    let id: String = row.get("id");
    let experience_json: String = row.get("experience_json");
    let check_in_id: String = row.get("check_in_id");
    let user_id: String = row.get("user_id");
    let feeling: String = row.get("feeling");
    let severity: i64 = row.get("severity");

    let experience: Experience = serde_json::from_str(&experience_json)
        .context("Failed to deserialize stored experience")?;

    let check_in = CheckIn {
        id: Uuid::parse_str(&check_in_id).context("Invalid check-in id in database")?,
        user_id: Uuid::parse_str(&user_id).context("Invalid user id in database")?,
        feeling: feeling
            .parse::<Feeling>()
            .context("Invalid feeling in database")?,
        severity: Severity::new(severity as u8).context("Invalid severity in database")?,
        note: row.get("note"),
        created_at: row.get("check_in_created_at"),
    };

    Ok(RelaxationSession {
        id: Uuid::parse_str(&id).context("Invalid session id in database")?,
        check_in,
        experience,
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
    })
}

// ============================================================================
// History
// ============================================================================

#[async_trait]
impl HistoryStore for SqliteStore {
    async fn record_session(
        &self,
        check_in: &CheckIn,
        experience: &Experience,
    ) -> Result<RelaxationSession> {
        let experience_json =
            serde_json::to_string(experience).context("Failed to serialize experience")?;
        let session_id = Uuid::new_v4();
        let now = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO check_ins (id, user_id, feeling, severity, note, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(check_in.id.to_string())
        .bind(check_in.user_id.to_string())
        .bind(check_in.feeling.as_str())
        .bind(check_in.severity.get() as i64)
        .bind(&check_in.note)
        .bind(check_in.created_at)
        .execute(&mut *tx)
        .await
        .context("Failed to insert check-in")?;

        sqlx::query(
            "INSERT INTO relaxation_sessions \
             (id, check_in_id, experience_json, duration_minutes, created_at, completed_at) \
             VALUES (?, ?, ?, ?, ?, NULL)",
        )
        .bind(session_id.to_string())
        .bind(check_in.id.to_string())
        .bind(&experience_json)
        .bind(experience.duration_minutes as i64)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("Failed to insert relaxation session")?;

        tx.commit().await?;

        tracing::debug!(session = %session_id, feeling = %check_in.feeling, "session recorded");

        Ok(RelaxationSession {
            id: session_id,
            check_in: check_in.clone(),
            experience: experience.clone(),
            created_at: now,
            completed_at: None,
        })
    }

    async fn history(&self, user_id: Uuid, limit: i64) -> Result<Vec<RelaxationSession>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} \
             FROM relaxation_sessions s \
             JOIN check_ins c ON c.id = s.check_in_id \
             WHERE c.user_id = ? \
             ORDER BY s.created_at DESC, s.rowid DESC \
             LIMIT ?"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .context("Failed to query history")?;

        rows.iter().map(session_from_row).collect()
    }

    async fn session_by_id(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Option<RelaxationSession>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} \
             FROM relaxation_sessions s \
             JOIN check_ins c ON c.id = s.check_in_id \
             WHERE s.id = ? AND c.user_id = ?"
        );
        let row = sqlx::query(&sql)
            .bind(session_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query session")?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn mark_completed(&self, user_id: Uuid, session_id: Uuid) -> Result<Option<i64>> {
        let Some(session) = self.session_by_id(user_id, session_id).await? else {
            return Ok(None);
        };

        // Repeat completion is a no-op; keep the first timestamp.
        if let Some(ts) = session.completed_at {
            return Ok(Some(ts));
        }

        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            "UPDATE relaxation_sessions SET completed_at = ? WHERE id = ? AND completed_at IS NULL",
        )
        .bind(now)
        .bind(session_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to mark session completed")?;

        Ok(Some(now))
    }

    async fn summary(&self, user_id: Uuid) -> Result<MoodSummary> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, COALESCE(AVG(severity), 0.0) AS avg_severity \
             FROM check_ins WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to query summary totals")?;

        let total_sessions: i64 = row.get("total");
        let average_severity: f64 = row.get("avg_severity");

        let completed_row = sqlx::query(
            "SELECT COUNT(*) AS completed \
             FROM relaxation_sessions s \
             JOIN check_ins c ON c.id = s.check_in_id \
             WHERE c.user_id = ? AND s.completed_at IS NOT NULL",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to query completed count")?;
        let completed_sessions: i64 = completed_row.get("completed");

        let feeling_rows = sqlx::query(
            "SELECT feeling, COUNT(*) AS n FROM check_ins WHERE user_id = ? GROUP BY feeling",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to query feeling counts")?;

        let by_feeling = Feeling::ALL
            .iter()
            .map(|&feeling| {
                let count = feeling_rows
                    .iter()
                    .find(|r| r.get::<String, _>("feeling") == feeling.as_str())
                    .map(|r| r.get::<i64, _>("n"))
                    .unwrap_or(0);
                FeelingCount { feeling, count }
            })
            .collect();

        Ok(MoodSummary {
            total_sessions,
            completed_sessions,
            average_severity,
            by_feeling,
        })
    }
}

// ============================================================================
// Auth
// ============================================================================

#[async_trait]
impl AuthStore for SqliteStore {
    async fn upsert_user_by_email(&self, email: &str) -> Result<Uuid> {
        if let Some(row) = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up user")?
        {
            let id: String = row.get("id");
            return Uuid::parse_str(&id).context("Invalid user id in database");
        }

        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, created_at) VALUES (?, ?, ?)")
            .bind(id.to_string())
            .bind(email)
            .bind(chrono::Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .context("Failed to create user")?;

        tracing::info!(user = %id, "new user registered");
        Ok(id)
    }

    async fn issue_login_token(&self, email: &str, token: &str, ttl_secs: i64) -> Result<()> {
        let expires_at = chrono::Utc::now().timestamp() + ttl_secs;
        sqlx::query("INSERT INTO login_tokens (token, email, expires_at, used) VALUES (?, ?, ?, 0)")
            .bind(token)
            .bind(email)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .context("Failed to issue login token")?;
        Ok(())
    }

    async fn consume_login_token(&self, email: &str, token: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT email, expires_at, used FROM login_tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to look up login token")?;

        let Some(row) = row else {
            return Ok(false);
        };

        let token_email: String = row.get("email");
        let expires_at: i64 = row.get("expires_at");
        let used: i64 = row.get("used");
        let now = chrono::Utc::now().timestamp();

        if used != 0 || token_email != email || expires_at < now {
            return Ok(false);
        }

        // Burn the token inside the same transaction so it is single-use.
        sqlx::query("UPDATE login_tokens SET used = 1 WHERE token = ?")
            .bind(token)
            .execute(&mut *tx)
            .await
            .context("Failed to burn login token")?;

        tx.commit().await?;
        Ok(true)
    }

    async fn create_api_session(&self, user_id: Uuid, token: &str, ttl_secs: i64) -> Result<()> {
        let expires_at = chrono::Utc::now().timestamp() + ttl_secs;
        sqlx::query("INSERT INTO api_sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(user_id.to_string())
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .context("Failed to create API session")?;
        Ok(())
    }

    async fn resolve_api_session(&self, token: &str) -> Result<Option<Uuid>> {
        let row = sqlx::query("SELECT user_id, expires_at FROM api_sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to resolve API session")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: i64 = row.get("expires_at");
        if expires_at < chrono::Utc::now().timestamp() {
            return Ok(None);
        }

        let user_id: String = row.get("user_id");
        Ok(Some(
            Uuid::parse_str(&user_id).context("Invalid user id in database")?,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
