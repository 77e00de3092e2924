//! Session context: persisted credentials and identity for the active user
//!
//! Replaces browser local storage with an explicit store injected into the
//! client. Only one session is active at a time; establishing a new one
//! always wipes the previous one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Storage keys used by the session store
pub mod keys {
    /// Generic credential slot, checked first
    pub const AUTH_TOKEN: &str = "auth_token";
    /// Admin and super-admin credential slot
    pub const ADMIN_TOKEN: &str = "admin_token";
    /// Voter credential slot
    pub const VOTER_TOKEN: &str = "voter_token";
    pub const USER_ROLE: &str = "user_role";
    /// Serialized profile payload returned by admin logins
    pub const USER_DATA: &str = "user_data";
    pub const VOTER_ID: &str = "voter_id";
    /// Voter registration number (NIM)
    pub const VOTER_NIM: &str = "voter_nim";
    pub const VOTER_NAME: &str = "voter_name";

    /// Credential slots in lookup precedence order
    pub const CREDENTIAL_PRECEDENCE: [&str; 3] = [AUTH_TOKEN, ADMIN_TOKEN, VOTER_TOKEN];
}

/// Role of the authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "super-admin")]
    SuperAdmin,
    /// A voter
    #[serde(rename = "pemilih")]
    Pemilih,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SuperAdmin => "super-admin",
            Role::Pemilih => "pemilih",
        }
    }

    /// Storage key of the role-specific credential slot
    pub fn credential_key(&self) -> &'static str {
        match self {
            Role::Admin | Role::SuperAdmin => keys::ADMIN_TOKEN,
            Role::Pemilih => keys::VOTER_TOKEN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "super-admin" | "super_admin" | "superadmin" => Ok(Role::SuperAdmin),
            "pemilih" | "voter" => Ok(Role::Pemilih),
            other => Err(format!("Unknown role '{other}'")),
        }
    }
}

/// Identity fields persisted after a voter login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterIdentity {
    pub id: Option<String>,
    pub nim: String,
    pub name: String,
}

/// Everything written to the store when a login succeeds
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    /// Profile payload (admin logins); stored serialized
    pub user_data: Option<serde_json::Value>,
    pub voter: Option<VoterIdentity>,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
            user_data: None,
            voter: None,
        }
    }

    pub fn with_user_data(mut self, user: serde_json::Value) -> Self {
        self.user_data = Some(user);
        self
    }

    pub fn with_voter(mut self, voter: VoterIdentity) -> Self {
        self.voter = Some(voter);
        self
    }
}

/// Key-value store holding the active session
///
/// Implementors provide raw `get`/`set`/`clear`; the credential lookup and
/// session establishment rules are shared.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    /// Removes every key
    fn clear(&self);

    /// Resolves a bearer credential.
    ///
    /// With no role, slots are checked generic, then admin, then voter and
    /// the first non-empty value wins. With a role, only that role's slot is
    /// read.
    fn credential(&self, role: Option<Role>) -> Option<String> {
        match role {
            Some(role) => non_empty(self.get(role.credential_key())),
            None => keys::CREDENTIAL_PRECEDENCE
                .iter()
                .find_map(|key| non_empty(self.get(key))),
        }
    }

    /// Replaces whatever session is stored with `session`
    fn set_session(&self, session: &Session) {
        self.clear();

        self.set(keys::AUTH_TOKEN, &session.token);
        self.set(session.role.credential_key(), &session.token);
        self.set(keys::USER_ROLE, session.role.as_str());

        if let Some(ref user) = session.user_data {
            self.set(keys::USER_DATA, &user.to_string());
        }

        if let Some(ref voter) = session.voter {
            if let Some(ref id) = voter.id {
                self.set(keys::VOTER_ID, id);
            }
            self.set(keys::VOTER_NIM, &voter.nim);
            self.set(keys::VOTER_NAME, &voter.name);
        }
    }

    /// Role of the active session, if it is one this client knows
    fn role(&self) -> Option<Role> {
        non_empty(self.get(keys::USER_ROLE)).and_then(|r| r.parse().ok())
    }

    /// Parsed profile payload stored by an admin login
    fn user_data(&self) -> Option<serde_json::Value> {
        non_empty(self.get(keys::USER_DATA)).and_then(|raw| serde_json::from_str(&raw).ok())
    }

    fn is_authenticated(&self) -> bool {
        non_empty(self.get(keys::AUTH_TOKEN)).is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// In-memory session store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

/// Session store persisted as a JSON object in a file
///
/// Every write rewrites the file and `clear` deletes it. IO failures are
/// logged and otherwise ignored, leaving the in-memory view authoritative.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileSessionStore {
    /// Opens the store at `path`, loading any previously saved session
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring unreadable session file {}: {e}", path.display());
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Failed to read session file {}: {e}", path.display());
                HashMap::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let json = match serde_json::to_string_pretty(entries) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize session: {e}");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!("Failed to create {}: {e}", parent.display());
                    return;
                }
            }
        }
        if let Err(e) = write_private(&self.path, json.as_bytes()) {
            warn!("Failed to write session file {}: {e}", self.path.display());
        }
    }
}

/// Writes `contents` to `path` readable and writable by the owner only
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // mode() only applies on creation; tighten a file left by an older run
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents)?;
    file.flush()
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed session file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove session file {}: {e}", self.path.display()),
        }
    }
}
