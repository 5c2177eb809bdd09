use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Signals the client raises about the login session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A request came back 401; the stored token has been cleared
    Expired { path: String },
    /// The user logged out explicitly
    SignedOut,
}

/// Port for wherever the bearer token is persisted between runs
pub trait TokenStore: Send + Sync + 'static {
    /// Current token, read fresh on every call
    fn token(&self) -> Option<String>;

    fn set_token(&self, token: &str) -> Result<()>;

    /// Forget the token; a no-op when none is stored
    fn clear(&self) -> Result<()>;
}

/// Token held in process memory only
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.write() = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// Token persisted as `{"token": "..."}` in a JSON file
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredSession> {
        let raw = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        match self.read() {
            Ok(session) if !session.token.is_empty() => Some(session.token),
            Ok(_) | Err(Error::NotFound) => None,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn set_token(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let session = StoredSession {
            token: token.to_string(),
        };
        fs::write(&self.path, serde_json::to_vec(&session)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
