use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Fixed key under which the conversation is persisted.
pub const STORAGE_KEY: &str = "megaChef_conversationHistory";

/// Durable storage for a single serialized value.
pub trait HistoryStorage {
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> io::Result<Option<String>>;

    fn write(&self, contents: &str) -> io::Result<()>;

    /// Removing a value that does not exist is not an error.
    fn remove(&self) -> io::Result<()>;
}

/// Stores the conversation as a JSON file on disk.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.local/share/megachef/megaChef_conversationHistory.json` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("megachef").join(format!("{}.json", STORAGE_KEY)))
    }
}

impl HistoryStorage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, contents)
    }

    fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// In-memory storage, used when nothing should touch the disk.
#[derive(Default)]
pub struct MemoryStorage {
    value: RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_contents(contents: &str) -> Self {
        Self {
            value: RefCell::new(Some(contents.to_string())),
        }
    }

    #[cfg(test)]
    pub fn contents(&self) -> Option<String> {
        self.value.borrow().clone()
    }
}

impl HistoryStorage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.value.borrow().clone())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.value.borrow_mut() = Some(contents.to_string());
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        *self.value.borrow_mut() = None;
        Ok(())
    }
}
