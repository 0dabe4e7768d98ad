use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

/// Local-storage key holding the anonymous session token.
pub const SESSION_TOKEN_KEY: &str = "nutripaw.session_token";
/// Local-storage key holding the serialized favorites list.
pub const FAVORITES_KEY: &str = "nutripaw.favorites";

/// Browser-local-storage stand-in: a string key-value store.
///
/// Writes are infallible by contract, like `localStorage`. Failures are
/// logged and the in-memory value stays authoritative for the session.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory storage, used by tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("storage poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("storage poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().expect("storage poisoned").remove(key);
    }
}

/// File-backed storage: the whole map serialized as one JSON object,
/// rewritten on every change, reloaded on open.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring corrupt storage file {:?}: {}", path, e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        match serde_json::to_string_pretty(entries) {
            Ok(raw) => {
                if let Err(e) = fs::write(&self.path, raw) {
                    warn!("Failed to write storage file {:?}: {}", self.path, e);
                }
            }
            Err(e) => warn!("Failed to serialize storage: {}", e),
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("storage poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().expect("storage poisoned");
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().expect("storage poisoned");
        entries.remove(key);
        self.flush(&entries);
    }
}

/// Returns the anonymous session token, generating and persisting one on
/// first call. The token is created once per browser and reused so the
/// anonymous cart survives page loads.
pub fn ensure_session_token<S: KeyValueStorage>(storage: &S) -> String {
    if let Some(token) = storage.get(SESSION_TOKEN_KEY) {
        if !token.is_empty() {
            return token;
        }
    }

    let token = Uuid::new_v4().to_string();
    storage.set(SESSION_TOKEN_KEY, &token);
    token
}
