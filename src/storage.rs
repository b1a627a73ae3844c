use crate::errors::StorageError;
use crate::models::{is_valid_mood, normalize_note, MoodEntry};
use chrono::NaiveDate;
use serde_json::Value;
use std::{
    collections::{HashMap, HashSet},
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Whole-value key-value storage. `write` replaces whatever was stored under
/// the key; there is no merge or partial update.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Rename over the old file so readers never observe a half-written value.
        // Each write gets its own temp name; concurrent writers must not share one.
        let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
        fs::write(&tmp, value)?;
        if let Err(err) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_owned(), value.to_owned());
        }
        store
    }

    /// Makes every subsequent write fail, like a full or disabled browser store.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("storage quota exceeded".into()));
        }
        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))?;
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The entry was applied in memory. `persisted` is false when the backend
    /// refused the write; the returned entries still reflect the change.
    Saved {
        entry: MoodEntry,
        entries: Vec<MoodEntry>,
        persisted: bool,
    },
    /// The mood was out of range; `entries` is the input, untouched.
    Rejected { entries: Vec<MoodEntry> },
}

impl UpsertOutcome {
    pub fn entries(&self) -> &[MoodEntry] {
        match self {
            UpsertOutcome::Saved { entries, .. } | UpsertOutcome::Rejected { entries } => entries,
        }
    }

    pub fn entry(&self) -> Option<&MoodEntry> {
        match self {
            UpsertOutcome::Saved { entry, .. } => Some(entry),
            UpsertOutcome::Rejected { .. } => None,
        }
    }
}

/// The mood journal as persisted under a single key of a [`KeyValueStore`].
///
/// Every call reads or replaces the whole collection. Two writers racing on
/// the same backend resolve as last-writer-wins.
#[derive(Clone)]
pub struct EntryStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
}

impl EntryStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored journal. Absent, unreadable or malformed data yields
    /// an empty list.
    pub fn load_all(&self) -> Vec<MoodEntry> {
        match self.backend.read(&self.key) {
            Ok(Some(raw)) => parse_entries(&raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                error!(key = %self.key, error = %err, "failed to read mood entries");
                Vec::new()
            }
        }
    }

    pub fn upsert(
        &self,
        existing: &[MoodEntry],
        date: NaiveDate,
        mood: u8,
        note: Option<&str>,
    ) -> UpsertOutcome {
        let Some((entry, entries)) = apply_upsert(existing, date, mood, note) else {
            warn!(%date, mood, "rejected mood outside 1..=5");
            return UpsertOutcome::Rejected {
                entries: existing.to_vec(),
            };
        };

        let persisted = match self.persist(&entries) {
            Ok(()) => true,
            Err(err) => {
                error!(key = %self.key, error = %err, "failed to persist mood entries");
                false
            }
        };
        info!(%date, mood, persisted, "saved mood entry");

        UpsertOutcome::Saved {
            entry,
            entries,
            persisted,
        }
    }

    fn persist(&self, entries: &[MoodEntry]) -> Result<(), StorageError> {
        let payload = serde_json::to_string(entries)?;
        self.backend.write(&self.key, &payload)
    }
}

pub fn find_by_date(entries: &[MoodEntry], date: NaiveDate) -> Option<&MoodEntry> {
    entries.iter().find(|entry| entry.date == date)
}

/// Pure half of an upsert: replaces the entry for `date` in place (keeping
/// its id) or appends a new one. Returns `None` for an out-of-range mood.
pub fn apply_upsert(
    existing: &[MoodEntry],
    date: NaiveDate,
    mood: u8,
    note: Option<&str>,
) -> Option<(MoodEntry, Vec<MoodEntry>)> {
    if !is_valid_mood(mood) {
        return None;
    }

    let note = normalize_note(note);
    let mut entries = existing.to_vec();
    let entry = match entries.iter().position(|entry| entry.date == date) {
        Some(index) => {
            let updated = MoodEntry {
                id: entries[index].id.clone(),
                date,
                mood,
                note,
            };
            entries[index] = updated.clone();
            updated
        }
        None => {
            let created = MoodEntry {
                id: new_entry_id(),
                date,
                mood,
                note,
            };
            entries.push(created.clone());
            created
        }
    };

    Some((entry, entries))
}

fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

/// Decodes a stored journal, dropping records that cannot be repaired and
/// any second record for an already-seen date.
pub fn parse_entries(raw: &str) -> Vec<MoodEntry> {
    let records = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            warn!("stored mood entries are not a list, ignoring them");
            return Vec::new();
        }
        Err(err) => {
            warn!(error = %err, "failed to parse stored mood entries");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(records.len());
    for record in &records {
        let Some(entry) = entry_from_value(record) else {
            warn!(%record, "dropping malformed mood entry");
            continue;
        };
        if !seen.insert(entry.date) {
            warn!(date = %entry.date, "dropping duplicate mood entry");
            continue;
        }
        entries.push(entry);
    }
    entries
}

fn entry_from_value(value: &Value) -> Option<MoodEntry> {
    let record = value.as_object()?;

    let date = record
        .get("date")?
        .as_str()
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())?;
    let mood = record
        .get("mood")?
        .as_u64()
        .and_then(|raw| u8::try_from(raw).ok())
        .filter(|mood| is_valid_mood(*mood))?;
    let id = match record.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => new_entry_id(),
    };
    let note = normalize_note(record.get("note").and_then(Value::as_str));

    Some(MoodEntry {
        id,
        date,
        mood,
        note,
    })
}
