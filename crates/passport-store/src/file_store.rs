use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use passport_core::{CollectorDocument, CollectorStore, StorageError, Username};

/// One pretty-printed JSON file per user: `<dir>/<username>.json`.
///
/// Usernames are restricted to ASCII alphanumerics, so they map to file
/// names directly. Writes go to a temporary file that is renamed into place.
pub struct FileCollectorStore {
    dir: PathBuf,
    // Serialises writers so temporary files and renames don't interleave.
    write_lock: Mutex<()>,
}

impl FileCollectorStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, user: &Username) -> PathBuf {
        self.dir.join(format!("{}.json", user))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CollectorStore for FileCollectorStore {
    fn load(&self, user: &Username) -> Result<Option<CollectorDocument>, StorageError> {
        let content = match fs::read_to_string(self.path_for(user)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, user: &Username, doc: &CollectorDocument) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(doc)?;
        let path = self.path_for(user);
        let tmp = path.with_extension("json.tmp");

        let _guard = self.lock();
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        tracing::trace!(path = %path.display(), "Wrote collector file");
        Ok(())
    }

    fn delete(&self, user: &Username) -> Result<bool, StorageError> {
        let _guard = self.lock();
        match fs::remove_file(self.path_for(user)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn rename(&self, from: &Username, to: &Username) -> Result<(), StorageError> {
        let source = self.path_for(from);
        let target = self.path_for(to);

        let _guard = self.lock();
        if target.exists() {
            return Err(StorageError::NameTaken(to.to_string()));
        }
        if !source.exists() {
            return Err(StorageError::NotFound(from.to_string()));
        }
        fs::rename(&source, &target)?;
        Ok(())
    }

    fn exists(&self, user: &Username) -> Result<bool, StorageError> {
        Ok(self.path_for(user).try_exists()?)
    }
}
