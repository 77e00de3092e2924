//! Request and response payloads exchanged with the voting backend

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Standard response wrapper: `{status, message, data, pagination}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    /// True when the backend reported `status: "success"`
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// Pagination block attached to list responses
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default = "default_page", deserialize_with = "lenient_number")]
    pub current_page: u32,
    #[serde(default, deserialize_with = "lenient_number")]
    pub per_page: u32,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total: u64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_pages: u32,
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default)]
    pub to: Option<u64>,
}

fn default_page() -> u32 {
    1
}

/// A candidate pair on the ballot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kandidat {
    #[serde(alias = "id", deserialize_with = "lenient_number")]
    pub kandidat_id: u64,
    /// Ballot number
    #[serde(default, deserialize_with = "lenient_number")]
    pub nomor_urut: u32,
    #[serde(default)]
    pub nama: String,
    /// Vote count; only present in results
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_suara: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `GET /results/summary`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultsSummary {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<Kandidat>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_pemilih: u64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_pemilih_sudah_memilih: u64,
}

/// A registered voter as listed for admins
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Voter {
    #[serde(deserialize_with = "lenient_number")]
    pub id: u64,
    #[serde(default)]
    pub nim: String,
    #[serde(default)]
    pub nama: String,
    #[serde(default)]
    pub fakultas: String,
    #[serde(default)]
    pub program_studi: String,
    /// One-time login token handed to the voter
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub sudah_memilih: bool,
    #[serde(default)]
    pub waktu_memilih: Option<String>,
}

/// Response of the admin and super-admin login endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminLoginResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user: Option<Value>,
}

/// Response of the voter login endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PemilihLoginResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub pemilih: Option<PemilihProfile>,
    #[serde(default)]
    pub voter_id: Option<Value>,
    #[serde(default)]
    pub voter_name: Option<String>,
}

/// Voter profile embedded in the login response
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PemilihProfile {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub nama: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Renders an id that may arrive as a JSON number or string
pub fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts a JSON number, a numeric string, or `null` (read as 0)
fn lenient_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let raw = match Value::deserialize(deserializer)? {
        Value::Null => 0,
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("expected a non-negative integer, got {n}")))?,
        Value::String(s) if s.trim().is_empty() => 0,
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| D::Error::custom(format!("invalid number \"{s}\": {e}")))?,
        other => {
            return Err(D::Error::custom(format!("expected a number, got {other}")));
        }
    };
    T::try_from(raw).map_err(|_| D::Error::custom(format!("number {raw} out of range")))
}

/// Accepts `true`/`false`, `0`/`1` and `"0"`/`"1"`
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    })
}
