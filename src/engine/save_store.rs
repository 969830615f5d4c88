use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use log::{error, info, warn};

use crate::model::session_snapshot::SessionSnapshot;

pub const SAVE_KEY: &str = "genesis-engine-manual-save";
pub const SAVE_VERSION: u32 = 1;

/// A string-keyed slot store. Implementations report failures; `SaveStore`
/// decides what to do with them.
pub trait SlotStorage: Send {
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&mut self, key: &str) -> io::Result<()>;
}

/// One `<key>.json` file per slot inside a directory.
pub struct FileSlotStorage {
    dir: PathBuf,
}

impl FileSlotStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SlotStorage for FileSlotStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Slots kept in memory, shared between clones.
#[derive(Clone, Default)]
pub struct MemorySlotStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|_| io::Error::other("slot storage poisoned"))
    }
}

impl SlotStorage for MemorySlotStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Shown on the main menu next to "Continue".
#[derive(Debug, Clone, PartialEq)]
pub struct SaveInfo {
    pub last_saved: Option<DateTime<Utc>>,
    pub chapter_info: String,
}

/// The single manual save slot. Storage trouble never escapes this type:
/// it is logged and turned into `false` / `None`.
pub struct SaveStore {
    storage: Box<dyn SlotStorage>,
}

impl SaveStore {
    pub fn new(storage: Box<dyn SlotStorage>) -> Self {
        Self { storage }
    }

    pub fn save(&mut self, snapshot: &SessionSnapshot) -> bool {
        let mut stamped = snapshot.clone();
        stamped.save_version = SAVE_VERSION;
        stamped.last_saved = Some(Utc::now());

        let json = match serde_json::to_string(&stamped) {
            Ok(json) => json,
            Err(err) => {
                error!("failed to serialize save: {err}");
                return false;
            }
        };

        match self.storage.write(SAVE_KEY, &json) {
            Ok(()) => {
                info!(
                    "saved game ({} messages, {} choices)",
                    stamped.conversation_history.len(),
                    stamped.total_choices
                );
                true
            }
            Err(err) => {
                error!("failed to save game: {err}");
                false
            }
        }
    }

    pub fn load(&mut self) -> Option<SessionSnapshot> {
        let text = match self.storage.read(SAVE_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(err) => {
                error!("failed to read save: {err}");
                return None;
            }
        };

        let snapshot: SessionSnapshot = match serde_json::from_str(&text) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("discarding unreadable save: {err}");
                self.delete();
                return None;
            }
        };

        if snapshot.save_version != SAVE_VERSION {
            warn!(
                "discarding save with version {} (expected {SAVE_VERSION})",
                snapshot.save_version
            );
            self.delete();
            return None;
        }

        Some(snapshot)
    }

    pub fn delete(&mut self) {
        if let Err(err) = self.storage.remove(SAVE_KEY) {
            error!("failed to delete save: {err}");
        }
    }

    pub fn exists(&self) -> bool {
        matches!(self.storage.read(SAVE_KEY), Ok(Some(_)))
    }

    pub fn save_info(&mut self) -> Option<SaveInfo> {
        let snapshot = self.load()?;
        Some(SaveInfo {
            last_saved: snapshot.last_saved,
            chapter_info: snapshot.chapter_info(),
        })
    }
}
