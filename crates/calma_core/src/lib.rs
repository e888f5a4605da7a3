pub mod config;
pub mod error;
pub mod types;

pub use config::CalmaConfig;
pub use error::CalmaError;
pub use types::{
    BreathingPattern, CheckIn, ContentItem, ContentKind, Experience, Feeling, FeelingCount,
    MoodSummary, RelaxationSession, Severity,
};

use async_trait::async_trait;
use uuid::Uuid;

/// Storage seam for check-in history. Implemented by `calma_store`.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist a check-in together with its generated experience.
    async fn record_session(
        &self,
        check_in: &CheckIn,
        experience: &Experience,
    ) -> anyhow::Result<RelaxationSession>;

    /// Newest-first session history for a user.
    async fn history(&self, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<RelaxationSession>>;

    /// Fetch one session. Returns None when absent or owned by someone else.
    async fn session_by_id(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> anyhow::Result<Option<RelaxationSession>>;

    /// Mark a session completed. Returns the completion timestamp, which is
    /// the stored one if the session was already completed.
    async fn mark_completed(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> anyhow::Result<Option<i64>>;

    /// Aggregate stats over a user's history.
    async fn summary(&self, user_id: Uuid) -> anyhow::Result<MoodSummary>;
}

/// Storage seam for the login-token / bearer-session flow.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Find or create the user for an email, returning their id.
    async fn upsert_user_by_email(&self, email: &str) -> anyhow::Result<Uuid>;

    /// Record a short-lived single-use login token for an email.
    async fn issue_login_token(
        &self,
        email: &str,
        token: &str,
        ttl_secs: i64,
    ) -> anyhow::Result<()>;

    /// Atomically validate and burn a login token. Returns false when the
    /// token is unknown, expired, already used, or issued for another email.
    async fn consume_login_token(&self, email: &str, token: &str) -> anyhow::Result<bool>;

    /// Record a bearer session token for a user.
    async fn create_api_session(
        &self,
        user_id: Uuid,
        token: &str,
        ttl_secs: i64,
    ) -> anyhow::Result<()>;

    /// Resolve a bearer token to a user id, if the session is still live.
    async fn resolve_api_session(&self, token: &str) -> anyhow::Result<Option<Uuid>>;
}

/// Everything the HTTP layer needs from storage.
pub trait CalmaStore: HistoryStore + AuthStore {}

impl<T: HistoryStore + AuthStore> CalmaStore for T {}
