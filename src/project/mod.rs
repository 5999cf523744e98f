//! Project persistence: document snapshots and a keyed project registry
//!
//! Snapshots are plain serde trees so any string-keyed backend works; the
//! bundled [`MemoryStore`] backs tests and native builds, while a wasm host
//! can implement [`ProjectStore`] over browser storage.

use crate::content::{PhotoBlock, Unit, UnitArena};
use crate::page::PageStore;
use crate::view::ViewMode;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const INDEX_KEY: &str = "daftar_projects";
const LAST_ACTIVE_KEY: &str = "daftar_last_project";
const PROJECT_PREFIX: &str = "daftar_project_";

/// Persistence failures
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The backend refused the write for lack of space
    #[error("storage quota exceeded")]
    QuotaExceeded,
    /// No project stored under this id
    #[error("unknown project: {0}")]
    UnknownProject(String),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Serialized form of one content unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitSnapshot {
    Text { content: String },
    Photo { block: PhotoBlock },
}

/// Serialized form of one page, units in reading order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub units: Vec<UnitSnapshot>,
}

/// Appearance settings carried with the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSettings {
    pub paper_color: String,
    pub font: String,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            paper_color: "#f4e4bc".to_string(),
            font: "'Amiri', serif".to_string(),
        }
    }
}

/// A complete saved document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub pages: Vec<PageSnapshot>,
    #[serde(default)]
    pub style: StyleSettings,
    #[serde(default)]
    pub current_page_index: usize,
    #[serde(default)]
    pub view_mode: ViewMode,
    /// Milliseconds since the epoch at capture time
    #[serde(default)]
    pub saved_at: u64,
}

impl ProjectSnapshot {
    /// Capture the live document
    pub fn capture(
        arena: &UnitArena,
        store: &PageStore,
        style: &StyleSettings,
        current_page_index: usize,
        view_mode: ViewMode,
        saved_at: u64,
    ) -> Self {
        let pages = store
            .iter()
            .map(|page| PageSnapshot {
                units: page
                    .units
                    .iter()
                    .filter_map(|&id| arena.get(id))
                    .map(|unit| match unit {
                        Unit::Text(content) => UnitSnapshot::Text {
                            content: content.clone(),
                        },
                        Unit::Photo(block) => UnitSnapshot::Photo {
                            block: block.clone(),
                        },
                    })
                    .collect(),
            })
            .collect();
        Self {
            pages,
            style: style.clone(),
            current_page_index,
            view_mode,
            saved_at,
        }
    }

    /// Rebuild an arena and page store from this snapshot
    pub fn instantiate(&self) -> (UnitArena, PageStore) {
        let mut arena = UnitArena::new();
        let mut store = PageStore::new();
        for (index, page) in self.pages.iter().enumerate() {
            let target = if index == 0 { 0 } else { store.append() };
            let ids: Vec<_> = page
                .units
                .iter()
                .map(|snapshot| {
                    arena.alloc(match snapshot {
                        UnitSnapshot::Text { content } => Unit::Text(content.clone()),
                        UnitSnapshot::Photo { block } => Unit::Photo(block.clone()),
                    })
                })
                .collect();
            if let Some(page) = store.page_mut(target) {
                page.units = ids;
            }
        }
        (arena, store)
    }
}

/// String-keyed storage backend, browser-localStorage shaped
pub trait ProjectStore {
    fn write(&mut self, key: &str, value: &str) -> Result<(), ProjectError>;
    fn read(&self, key: &str) -> Option<String>;
    fn delete(&mut self, key: &str);
}

/// In-memory backend with an optional byte quota
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that rejects writes once total stored bytes exceed `quota`
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            quota_bytes: Some(quota),
        }
    }

    fn used_bytes(&self) -> usize {
        self.entries.values().map(String::len).sum()
    }
}

impl ProjectStore for MemoryStore {
    fn write(&mut self, key: &str, value: &str) -> Result<(), ProjectError> {
        if let Some(quota) = self.quota_bytes {
            let existing = self.entries.get(key).map_or(0, String::len);
            if self.used_bytes() - existing + value.len() > quota {
                return Err(ProjectError::QuotaExceeded);
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn delete(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Index entry for one saved project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub id: String,
    pub name: String,
    /// Milliseconds since the epoch of the last save
    pub saved_at: u64,
}

/// Named saved projects over a storage backend.
///
/// The registry keeps an index of metadata under one key and each project
/// body under its own key, so listing projects never deserializes documents.
pub struct ProjectRegistry<S: ProjectStore> {
    store: S,
}

impl<S: ProjectStore> ProjectRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn read_index(&self) -> Vec<ProjectMeta> {
        self.store
            .read(INDEX_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn write_index(&mut self, index: &[ProjectMeta]) -> Result<(), ProjectError> {
        let raw = serde_json::to_string(index)?;
        self.store.write(INDEX_KEY, &raw)
    }

    /// All saved projects, most recently saved first
    pub fn list(&self) -> Vec<ProjectMeta> {
        let mut index = self.read_index();
        index.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        index
    }

    /// Save a snapshot under a fresh id derived from the save time
    pub fn create(
        &mut self,
        name: &str,
        snapshot: &ProjectSnapshot,
        now_ms: u64,
    ) -> Result<String, ProjectError> {
        let id = format!("proj_{}", now_ms);
        self.save(&id, name, snapshot)?;
        Ok(id)
    }

    /// Save a snapshot under an existing id, updating its index entry
    pub fn save(
        &mut self,
        id: &str,
        name: &str,
        snapshot: &ProjectSnapshot,
    ) -> Result<(), ProjectError> {
        let raw = serde_json::to_string(snapshot)?;
        self.store
            .write(&format!("{}{}", PROJECT_PREFIX, id), &raw)?;

        let mut index = self.read_index();
        match index.iter_mut().find(|meta| meta.id == id) {
            Some(meta) => {
                meta.name = name.to_string();
                meta.saved_at = snapshot.saved_at;
            }
            None => index.push(ProjectMeta {
                id: id.to_string(),
                name: name.to_string(),
                saved_at: snapshot.saved_at,
            }),
        }
        self.write_index(&index)?;
        self.store.write(LAST_ACTIVE_KEY, id)
    }

    /// Load a saved project
    pub fn load(&self, id: &str) -> Result<ProjectSnapshot, ProjectError> {
        let raw = self
            .store
            .read(&format!("{}{}", PROJECT_PREFIX, id))
            .ok_or_else(|| ProjectError::UnknownProject(id.to_string()))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Delete a project and its index entry
    pub fn remove(&mut self, id: &str) -> Result<(), ProjectError> {
        let mut index = self.read_index();
        let before = index.len();
        index.retain(|meta| meta.id != id);
        if index.len() == before {
            return Err(ProjectError::UnknownProject(id.to_string()));
        }
        self.store.delete(&format!("{}{}", PROJECT_PREFIX, id));
        if self.store.read(LAST_ACTIVE_KEY).as_deref() == Some(id) {
            self.store.delete(LAST_ACTIVE_KEY);
        }
        self.write_index(&index)
    }

    /// Id of the most recently saved or opened project
    pub fn last_active(&self) -> Option<String> {
        self.store.read(LAST_ACTIVE_KEY)
    }

    /// Mark a project as the one to reopen next session
    pub fn set_last_active(&mut self, id: &str) -> Result<(), ProjectError> {
        self.store.write(LAST_ACTIVE_KEY, id)
    }
}

/// Wall-clock milliseconds, for save timestamps and project ids
pub fn now_ms() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Unit;

    fn sample_snapshot() -> ProjectSnapshot {
        let mut arena = UnitArena::new();
        let mut store = PageStore::new();
        let a = arena.alloc(Unit::Text("صفحه اول".to_string()));
        let b = arena.alloc(Unit::Photo(PhotoBlock::new("cat.jpg", 120.0)));
        store.page_mut(0).unwrap().units.extend([a, b]);
        let second = store.append();
        let c = arena.alloc(Unit::Text("صفحه دوم".to_string()));
        store.page_mut(second).unwrap().units.push(c);

        ProjectSnapshot::capture(
            &arena,
            &store,
            &StyleSettings::default(),
            1,
            ViewMode::Double,
            42,
        )
    }

    #[test]
    fn test_capture_and_instantiate_round_trip() {
        let snapshot = sample_snapshot();
        assert_eq!(snapshot.pages.len(), 2);

        let (arena, store) = snapshot.instantiate();
        assert_eq!(store.len(), 2);
        assert_eq!(arena.len(), 3);
        let first = store.page(0).unwrap();
        assert_eq!(
            arena.get(first.units[0]).and_then(Unit::text),
            Some("صفحه اول")
        );
        assert!(arena.get(first.units[1]).unwrap().is_photo());
    }

    #[test]
    fn test_snapshot_survives_json() {
        let snapshot = sample_snapshot();
        let raw = serde_json::to_string(&snapshot).unwrap();
        let back: ProjectSnapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_registry_create_list_load() {
        let mut registry = ProjectRegistry::new(MemoryStore::new());
        let snapshot = sample_snapshot();
        let id = registry.create("دفترچه سفر", &snapshot, 1000).unwrap();
        assert_eq!(id, "proj_1000");

        let listed = registry.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "دفترچه سفر");
        assert_eq!(registry.last_active().as_deref(), Some(id.as_str()));

        let loaded = registry.load(&id).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_resave_updates_index_in_place() {
        let mut registry = ProjectRegistry::new(MemoryStore::new());
        let mut snapshot = sample_snapshot();
        let id = registry.create("قدیمی", &snapshot, 1000).unwrap();
        snapshot.saved_at = 2000;
        registry.save(&id, "جدید", &snapshot).unwrap();

        let listed = registry.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "جدید");
        assert_eq!(listed[0].saved_at, 2000);
    }

    #[test]
    fn test_list_sorts_most_recent_first() {
        let mut registry = ProjectRegistry::new(MemoryStore::new());
        let mut snapshot = sample_snapshot();
        snapshot.saved_at = 10;
        registry.create("الف", &snapshot, 10).unwrap();
        snapshot.saved_at = 30;
        registry.create("ب", &snapshot, 30).unwrap();
        snapshot.saved_at = 20;
        registry.create("ج", &snapshot, 20).unwrap();

        let names: Vec<_> = registry.list().into_iter().map(|m| m.name).collect();
        assert_eq!(names, ["ب", "ج", "الف"]);
    }

    #[test]
    fn test_remove_unknown_project() {
        let mut registry = ProjectRegistry::new(MemoryStore::new());
        assert!(matches!(
            registry.remove("proj_404"),
            Err(ProjectError::UnknownProject(_))
        ));
    }

    #[test]
    fn test_remove_clears_last_active() {
        let mut registry = ProjectRegistry::new(MemoryStore::new());
        let snapshot = sample_snapshot();
        let id = registry.create("موقت", &snapshot, 5).unwrap();
        registry.remove(&id).unwrap();
        assert!(registry.last_active().is_none());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_quota_exceeded() {
        let mut store = MemoryStore::with_quota(16);
        assert!(store.write("k", "0123456789").is_ok());
        assert!(matches!(
            store.write("k2", "0123456789"),
            Err(ProjectError::QuotaExceeded)
        ));
        // Overwriting the same key within quota still works
        assert!(store.write("k", "abcdef").is_ok());
    }
}
