use calma_core::{CheckIn, Experience, RelaxationSession};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// POST /auth/login body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// POST /auth/login response. The token field is only populated when the
/// server runs with `expose_login_token` (dev mode); otherwise the token is
/// delivered out-of-band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// POST /auth/verify body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub token: String,
}

/// POST /auth/verify response: the bearer token for subsequent calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub token: String,
    pub expires_in_secs: i64,
}

/// POST /checkin body. Feeling and severity arrive raw and are validated in
/// the handler so malformed values produce a 400 with a domain message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub feeling: String,
    pub severity: u8,
    #[serde(default)]
    pub note: Option<String>,
}

/// POST /checkin response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub session_id: Uuid,
    pub check_in: CheckIn,
    pub experience: Experience,
}

/// GET /history query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// GET /history response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub sessions: Vec<RelaxationSession>,
}

/// POST /sessions/{id}/complete response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteResponse {
    pub session_id: Uuid,
    pub completed_at: i64,
}

/// Minimal email sanity check: trimmed, lowercased, one `@` with non-empty
/// local part and domain. Returns the normalized address.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_ascii_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(email)
}
