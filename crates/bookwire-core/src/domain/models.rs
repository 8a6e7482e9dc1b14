use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A service category offered by a company.
///
/// Decoding is permissive on purpose: the upstream omits and renames fields
/// between endpoints, so unknown fields are ignored and the known ones
/// default when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub services: Vec<Service>,
}

/// One bookable service inside a category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u32>,
}

/// A service professional returned as part of slot data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Outcome of one successful authentication call. The caller owns the
/// lifetime; there is no refresh logic in this adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub session_id: String,
    /// Value of the upstream `token` cookie.
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AuthSession {
    /// Cookie fragment for replaying this session on subsequent calls.
    pub fn cookie(&self) -> String {
        format!("token={}", self.token)
    }
}
