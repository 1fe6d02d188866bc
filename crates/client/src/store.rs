//! Durable session-field persistence.
//!
//! Three independently-keyed string slots survive process restarts so a
//! reopened dashboard can resume its session context. The backend sits
//! behind the [`SessionStorage`] port so tests inject memory and the app
//! injects a file. Values are plaintext at rest (no expiry, no
//! encryption) — a deliberate property of this layer, matching what the
//! platform stores; the bearer credential itself never lands here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use wisal_auth::Role;
use wisal_core::{EmployeeId, InstitutionId};

/// Storage key for the institution identifier.
pub const INSTITUTION_ID_KEY: &str = "institutionId";
/// Storage key for the role.
pub const ROLE_KEY: &str = "role";
/// Storage key for the employee identifier.
pub const EMPLOYEE_ID_KEY: &str = "employeeId";

/// Persistence port for session fields.
///
/// `set(key, None)` removes the key entirely; absence of a key means "no
/// value", never an empty string. Implementations are best-effort: a
/// failed write is logged, not surfaced.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: Option<&str>);
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: Option<&str>) {
        let mut inner = self.inner.write().unwrap();
        match value {
            Some(value) => {
                inner.insert(key.to_string(), value.to_string());
            }
            None => {
                inner.remove(key);
            }
        }
    }
}

/// File-backed storage: one JSON object, written through on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the store at an explicit path.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<HashMap<String, String>>(&bytes)
                .unwrap_or_else(|error| {
                    tracing::warn!(%error, path = %path.display(), "session file unreadable; starting empty");
                    HashMap::new()
                }),
            // Missing file is the normal first-run case.
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    /// Open the store at the platform's local data directory.
    pub fn open_default() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::open(base.join("wisal").join("session.json"))
    }

    fn persist(&self, snapshot: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(error) = std::fs::create_dir_all(parent) {
                tracing::warn!(%error, "could not create session directory");
                return;
            }
        }

        let json = match serde_json::to_vec_pretty(snapshot) {
            Ok(json) => json,
            Err(error) => {
                tracing::warn!(%error, "could not serialize session fields");
                return;
            }
        };

        if let Err(error) = std::fs::write(&self.path, json) {
            tracing::warn!(%error, path = %self.path.display(), "could not persist session fields");
        }
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: Option<&str>) {
        let mut cache = self.cache.write().unwrap();
        match value {
            Some(value) => {
                cache.insert(key.to_string(), value.to_string());
            }
            None => {
                cache.remove(key);
            }
        }
        self.persist(&cache);
    }
}

/// Typed facade over the three session slots.
///
/// The role getter re-validates whatever was persisted: a value outside
/// the fixed role set loads as `None` rather than being trusted verbatim.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    pub fn institution_id(&self) -> Option<InstitutionId> {
        self.storage
            .get(INSTITUTION_ID_KEY)
            .and_then(|raw| InstitutionId::new(raw).ok())
    }

    pub fn set_institution_id(&self, id: Option<&InstitutionId>) {
        self.storage.set(INSTITUTION_ID_KEY, id.map(InstitutionId::as_str));
    }

    pub fn role(&self) -> Option<Role> {
        self.storage.get(ROLE_KEY).and_then(|raw| Role::parse(&raw))
    }

    pub fn set_role(&self, role: Option<Role>) {
        self.storage.set(ROLE_KEY, role.map(|r| r.as_str()));
    }

    pub fn employee_id(&self) -> Option<EmployeeId> {
        self.storage
            .get(EMPLOYEE_ID_KEY)
            .and_then(|raw| EmployeeId::new(raw).ok())
    }

    pub fn set_employee_id(&self, id: Option<&EmployeeId>) {
        self.storage.set(EMPLOYEE_ID_KEY, id.map(EmployeeId::as_str));
    }

    /// Remove all three slots.
    pub fn clear(&self) {
        self.storage.set(INSTITUTION_ID_KEY, None);
        self.storage.set(ROLE_KEY, None);
        self.storage.set(EMPLOYEE_ID_KEY, None);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn slots_are_independent() {
        let store = memory_store();
        let inst = InstitutionId::new("inst-3").unwrap();

        store.set_institution_id(Some(&inst));
        store.set_role(Some(Role::Publisher));

        assert_eq!(store.institution_id(), Some(inst));
        assert_eq!(store.role(), Some(Role::Publisher));
        assert_eq!(store.employee_id(), None);

        store.set_role(None);
        assert_eq!(store.role(), None);
        assert_eq!(store.institution_id().unwrap().as_str(), "inst-3");
    }

    #[test]
    fn set_none_removes_the_key() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(ROLE_KEY, Some("ADMIN"));
        storage.set(ROLE_KEY, None);
        assert_eq!(storage.get(ROLE_KEY), None);
    }

    #[test]
    fn persisted_role_is_revalidated_on_load() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(ROLE_KEY, Some("SUPERADMIN"));

        let store = SessionStore::new(storage);
        assert_eq!(store.role(), None);
    }

    #[test]
    fn clear_removes_all_slots() {
        let store = memory_store();
        store.set_institution_id(Some(&InstitutionId::new("inst-1").unwrap()));
        store.set_role(Some(Role::Admin));
        store.set_employee_id(Some(&EmployeeId::new("emp-1").unwrap()));

        store.clear();
        assert_eq!(store.institution_id(), None);
        assert_eq!(store.role(), None);
        assert_eq!(store.employee_id(), None);
    }

    #[test]
    fn file_storage_round_trips_across_instances() {
        let dir = std::env::temp_dir().join(format!("wisal-store-{}", std::process::id()));
        let path = dir.join("session.json");
        let _ = std::fs::remove_file(&path);

        {
            let storage = FileStorage::open(&path);
            storage.set(INSTITUTION_ID_KEY, Some("inst-9"));
            storage.set(ROLE_KEY, Some("ADMIN"));
            storage.set(ROLE_KEY, None);
        }

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get(INSTITUTION_ID_KEY).as_deref(), Some("inst-9"));
        assert_eq!(reopened.get(ROLE_KEY), None);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = std::env::temp_dir().join(format!("wisal-corrupt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.json");
        std::fs::write(&path, b"not json at all").unwrap();

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get(INSTITUTION_ID_KEY), None);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
