use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::store::{SessionRecord, TokenStore, STORAGE_KEY};

/// File-backed session store.
///
/// The record lives at `<session dir>/challengers-account.json` and survives
/// restarts of the client, but not a move to another machine.
pub struct FileTokenStore {
    session_dir: PathBuf,
    // Serializes read-modify-write sequences such as `clear_if`
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(session_dir: PathBuf) -> Self {
        Self {
            session_dir,
            lock: Mutex::new(()),
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.session_dir.join(format!("{}.json", STORAGE_KEY))
    }

    fn load(path: &Path) -> Option<String> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to read session file");
                return None;
            }
        };
        SessionRecord::parse(&contents).and_then(SessionRecord::into_token)
    }

    fn save(&self, token: &str) -> Result<()> {
        let path = self.session_path();
        std::fs::create_dir_all(&self.session_dir)
            .context("Failed to create session directory")?;

        let contents = serde_json::to_string_pretty(&SessionRecord::new(token))?;

        // Write then rename so a reader never sees a half-written record
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).context("Failed to write session file")?;
        std::fs::rename(&tmp, &path).context("Failed to replace session file")?;
        debug!(path = %path.display(), "Session saved");
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let path = self.session_path();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove session file"),
        }
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Option<String> {
        let _guard = self.guard();
        Self::load(&self.session_path())
    }

    fn write(&self, token: &str) -> Result<()> {
        let _guard = self.guard();
        if token.is_empty() {
            return self.remove();
        }
        self.save(token)
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.guard();
        self.remove()
    }

    fn clear_if(&self, token: &str) -> Result<bool> {
        let _guard = self.guard();
        if Self::load(&self.session_path()).as_deref() == Some(token) {
            self.remove()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
