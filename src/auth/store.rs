use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::Session;
use crate::error::{BunkhouseError, Result};

const SESSION_FILE: &str = "session.toml";

/// Storage abstraction for the persisted session.
///
/// `clear` removes both tokens in one step; implementations must not leave
/// a state where one token is present and the other absent.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Configuration for file-backed session storage.
#[derive(Debug, Clone)]
pub struct TokenStoreConfig {
    pub base_dir: PathBuf,
}

impl TokenStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_bunkhouse_dir()
    }
}

/// File-backed session store using a single TOML file.
///
/// Both tokens live in one file, so saving and clearing are atomic at file
/// granularity and survive process restarts.
///
/// # Example
/// ```no_run
/// use bunkhouse::auth::{FileTokenStore, Session, TokenStore};
///
/// let store = FileTokenStore::new_default();
/// let session = Session::new("access", Some("refresh".to_string()));
/// store.save(&session)?;
/// # Ok::<(), bunkhouse::error::BunkhouseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    base_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(config: TokenStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_bunkhouse_dir(),
        }
    }

    fn session_path(&self) -> PathBuf {
        self.base_dir.join(SESSION_FILE)
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Session>> {
        let path = self.session_path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(BunkhouseError::Io(err)),
        };
        let file: SessionFile = toml::from_str(&raw)?;
        Ok(Some(file.session))
    }

    fn save(&self, session: &Session) -> Result<()> {
        let path = self.session_path();
        Self::ensure_parent(&path)?;
        let file = SessionFile {
            version: 1,
            session: session.clone(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.session_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(BunkhouseError::Io(err)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    session: Session,
    saved_at: DateTime<Utc>,
}

fn default_bunkhouse_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".bunkhouse"))
        .unwrap_or_else(|| PathBuf::from(".bunkhouse"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileTokenStore) {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(TokenStoreConfig::new(dir.path().to_path_buf()));
        (dir, store)
    }

    #[test]
    fn session_round_trip_works() {
        let (_dir, store) = temp_store();
        let session = Session::new("access", Some("refresh".to_string()));
        store.save(&session).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));
    }

    #[test]
    fn missing_file_loads_as_logged_out() {
        let (_dir, store) = temp_store();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn clear_removes_session() {
        let (_dir, store) = temp_store();
        let session = Session::new("access", None);
        store.save(&session).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn clear_succeeds_when_already_logged_out() {
        let (_dir, store) = temp_store();
        store.clear().unwrap();
    }

    #[test]
    fn save_overwrites_previous_session() {
        let (_dir, store) = temp_store();
        store
            .save(&Session::new("old", Some("old-refresh".to_string())))
            .unwrap();
        store.save(&Session::new("new", None)).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "new");
        assert!(loaded.refresh_token.is_none());
    }
}
