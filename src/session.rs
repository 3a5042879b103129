use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Bearer token as persisted on disk and as returned by the auth endpoints.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoredToken {
    pub access_token: String,
    pub token_type: String,
}

/// Returns the path to the token file (`token.json`).
///
/// The path is determined in the following order:
/// 1. `TASKFLOW_TOKEN_FILE` environment variable.
/// 2. `~/.local/share/taskflow/token.json` (on Linux).
/// 3. `./token.json` (fallback).
pub fn default_token_path() -> PathBuf {
    std::env::var("TASKFLOW_TOKEN_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("taskflow");
            if !p.exists() {
                let _ = fs::create_dir_all(&p);
            }
            p.push("token.json");
            p
        })
}

/// An authenticated session: the bearer token and where it lives on disk.
///
/// Login creates it, logout disposes it. Everything that talks to the
/// backend gets a `Session` at construction instead of reaching for
/// ambient global state.
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    token: Option<StoredToken>,
}

impl Session {
    /// Loads the session from the given token file.
    ///
    /// A missing or unreadable file yields an unauthenticated session.
    pub fn load(path: PathBuf) -> Session {
        let token = read_token(&path);
        Session { path, token }
    }

    /// The current access token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.access_token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Persists a new token, replacing any previous one.
    pub fn store(&mut self, token: StoredToken) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&token)?;
        fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        self.token = Some(token);
        Ok(())
    }

    /// Removes the token from memory and disk. Missing file is fine.
    pub fn clear(&mut self) -> Result<(), ApiError> {
        self.token = None;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Io(e)),
        }
    }
}

fn read_token(path: &Path) -> Option<StoredToken> {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("failed to read token file: {e}");
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(token) => Some(token),
        Err(e) => {
            tracing::warn!("failed to parse token file: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn token_path(dir: &TempDir) -> PathBuf {
        dir.path().join("token.json")
    }

    fn make_token() -> StoredToken {
        StoredToken {
            access_token: "tok-123".to_string(),
            token_type: "bearer".to_string(),
        }
    }

    #[test]
    fn missing_file_is_unauthenticated() {
        let dir = TempDir::new().unwrap();
        let session = Session::load(token_path(&dir));
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn invalid_json_is_unauthenticated() {
        let dir = TempDir::new().unwrap();
        let path = token_path(&dir);
        fs::write(&path, "not json").unwrap();
        assert!(!Session::load(path).is_authenticated());
    }

    #[test]
    fn store_and_reload_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = token_path(&dir);

        let mut session = Session::load(path.clone());
        session.store(make_token()).unwrap();
        assert_eq!(session.token(), Some("tok-123"));

        let reloaded = Session::load(path);
        assert_eq!(reloaded.token(), Some("tok-123"));
    }

    #[test]
    fn store_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("token.json");
        let mut session = Session::load(path.clone());
        session.store(make_token()).unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn store_sets_permissions_0600() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = token_path(&dir);
        let mut session = Session::load(path.clone());
        session.store(make_token()).unwrap();
        let perms = fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }

    #[test]
    fn clear_removes_token_and_file() {
        let dir = TempDir::new().unwrap();
        let path = token_path(&dir);
        let mut session = Session::load(path.clone());
        session.store(make_token()).unwrap();

        session.clear().unwrap();
        assert!(!session.is_authenticated());
        assert!(!path.exists());
    }

    #[test]
    fn clear_noop_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::load(token_path(&dir));
        assert!(session.clear().is_ok());
    }
}
