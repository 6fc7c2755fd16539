use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use super::storage::{load_record, save_record, KeyValueStore, Loaded, SHORTCUTS_KEY};

/// Target URL marking a shortcut as informational only.
pub const SENTINEL_URL: &str = "#";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Shortcut {
    pub id: String,
    pub name: String,
    pub url: String,
    pub icon_id: String,
}

impl Shortcut {
    pub fn is_actionable(&self) -> bool {
        self.url != SENTINEL_URL
    }

    /// The navigation target, or `None` for the sentinel.
    pub fn target(&self) -> Option<&str> {
        self.is_actionable().then_some(self.url.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortcut {
    pub name: String,
    pub url: String,
    pub icon_id: String,
}

impl NewShortcut {
    pub fn new(name: impl Into<String>, url: impl Into<String>, icon_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            icon_id: icon_id.into(),
        }
    }
}

/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortcutUpdate {
    pub name: Option<String>,
    pub url: Option<String>,
    pub icon_id: Option<String>,
}

impl ShortcutUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn icon_id(mut self, icon_id: impl Into<String>) -> Self {
        self.icon_id = Some(icon_id.into());
        self
    }

    fn apply(self, target: &mut Shortcut) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(url) = self.url {
            target.url = url;
        }
        if let Some(icon_id) = self.icon_id {
            target.icon_id = icon_id;
        }
    }
}

fn default_shortcuts() -> Vec<Shortcut> {
    let entry = |id: &str, name: &str, url: &str, icon: &str| Shortcut {
        id: id.into(),
        name: name.into(),
        url: url.into(),
        icon_id: icon.into(),
    };
    vec![
        entry("1", "Jellyfin", "http://192.168.31.96:8089", "Play"),
        entry("2", "qBittorrent", "http://192.168.31.96:8090", "Download"),
        entry("3", "SFTP WebUI", "http://192.168.31.96:8800", "FolderOpen"),
        entry("4", "SSH", SENTINEL_URL, "Terminal"),
    ]
}

// ── Id generation ─────────────────────────────────────────────────────────────

/// Millisecond timestamps, bumped past the last issued id so that ids stay
/// strictly increasing when several are generated within one millisecond or
/// the clock steps backwards.
#[derive(Debug, Clone, Default)]
struct IdSource {
    last: u64,
}

impl IdSource {
    fn seeded_from(shortcuts: &[Shortcut]) -> Self {
        let last = shortcuts
            .iter()
            .filter_map(|s| s.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self { last }
    }

    fn next_at(&mut self, now_ms: u64) -> String {
        self.last = now_ms.max(self.last.saturating_add(1));
        self.last.to_string()
    }

    fn next(&mut self) -> String {
        let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_at(now_ms)
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

pub struct ShortcutRegistry {
    storage: Rc<dyn KeyValueStore>,
    shortcuts: Vec<Shortcut>,
    ids: IdSource,
}

impl ShortcutRegistry {
    pub fn open(storage: Rc<dyn KeyValueStore>) -> Self {
        let shortcuts = match load_record::<Vec<Shortcut>>(storage.as_ref(), SHORTCUTS_KEY) {
            Loaded::Found(shortcuts) => shortcuts,
            Loaded::Missing | Loaded::Corrupt => {
                tracing::info!("seeding default shortcuts");
                let shortcuts = default_shortcuts();
                save_record(storage.as_ref(), SHORTCUTS_KEY, &shortcuts);
                shortcuts
            }
        };
        let ids = IdSource::seeded_from(&shortcuts);
        Self {
            storage,
            shortcuts,
            ids,
        }
    }

    fn persist(&self) {
        save_record(self.storage.as_ref(), SHORTCUTS_KEY, &self.shortcuts);
    }

    /// Display order is insertion order.
    pub fn list_shortcuts(&self) -> Vec<Shortcut> {
        self.shortcuts.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Shortcut> {
        self.shortcuts.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }

    pub fn add_shortcut(&mut self, new: NewShortcut) -> Shortcut {
        let shortcut = Shortcut {
            id: self.ids.next(),
            name: new.name,
            url: new.url,
            icon_id: new.icon_id,
        };
        self.shortcuts.push(shortcut.clone());
        self.persist();
        tracing::info!(id = %shortcut.id, name = %shortcut.name, "shortcut added");
        shortcut
    }

    pub fn update_shortcut(&mut self, id: &str, update: ShortcutUpdate) -> bool {
        let Some(existing) = self.shortcuts.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        update.apply(existing);
        self.persist();
        tracing::info!(id, "shortcut updated");
        true
    }

    pub fn remove_shortcut(&mut self, id: &str) -> bool {
        let before = self.shortcuts.len();
        self.shortcuts.retain(|s| s.id != id);
        if self.shortcuts.len() == before {
            return false;
        }
        self.persist();
        tracing::info!(id, "shortcut removed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use std::collections::HashSet;

    fn fresh() -> (Rc<MemoryStore>, ShortcutRegistry) {
        let storage = Rc::new(MemoryStore::new());
        let registry = ShortcutRegistry::open(storage.clone());
        (storage, registry)
    }

    #[test]
    fn seeds_four_defaults_in_order() {
        let (_, registry) = fresh();
        let names: Vec<String> = registry.list_shortcuts().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Jellyfin", "qBittorrent", "SFTP WebUI", "SSH"]);
        let ssh = registry.get("4").unwrap();
        assert!(!ssh.is_actionable());
        assert_eq!(ssh.target(), None);
        assert_eq!(
            registry.get("1").and_then(Shortcut::target),
            Some("http://192.168.31.96:8089")
        );
    }

    #[test]
    fn persisted_layout_uses_camel_case_array() {
        let (storage, _) = fresh();
        let raw = storage.get(SHORTCUTS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value[3]["iconId"], "Terminal");
        assert_eq!(value[3]["url"], "#");
    }

    #[test]
    fn list_is_a_copy() {
        let (_, registry) = fresh();
        let mut copy = registry.list_shortcuts();
        copy[0].name = "Tampered".into();
        copy.clear();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("1").unwrap().name, "Jellyfin");
    }

    #[test]
    fn add_appends_with_fresh_id() {
        let (_, mut registry) = fresh();
        let before: HashSet<String> = registry.list_shortcuts().into_iter().map(|s| s.id).collect();
        let added = registry.add_shortcut(NewShortcut::new("Grafana", "http://nas:3000", "Monitor"));

        let after = registry.list_shortcuts();
        assert_eq!(after.len(), before.len() + 1);
        assert!(!before.contains(&added.id));
        assert_eq!(after.last(), Some(&added));
    }

    #[test]
    fn rapid_additions_get_distinct_ids() {
        let (_, mut registry) = fresh();
        let ids: HashSet<String> = (0..50)
            .map(|i| registry.add_shortcut(NewShortcut::new(format!("s{i}"), "#", "Globe")).id)
            .collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn id_source_is_monotonic_under_a_stuck_clock() {
        let mut ids = IdSource::default();
        assert_eq!(ids.next_at(1_000), "1000");
        assert_eq!(ids.next_at(1_000), "1001");
        assert_eq!(ids.next_at(999), "1002");
        assert_eq!(ids.next_at(5_000), "5000");
    }

    #[test]
    fn id_source_skips_past_loaded_ids() {
        let loaded = vec![Shortcut {
            id: "9999999999999999".into(),
            name: "future".into(),
            url: "#".into(),
            icon_id: "Globe".into(),
        }];
        let mut ids = IdSource::seeded_from(&loaded);
        assert_eq!(ids.next_at(1), "10000000000000000");
    }

    #[test]
    fn update_merges_only_given_fields() {
        let (_, mut registry) = fresh();
        assert!(registry.update_shortcut("2", ShortcutUpdate::default().name("X")));
        let updated = registry.get("2").unwrap();
        assert_eq!(updated.name, "X");
        assert_eq!(updated.url, "http://192.168.31.96:8090");
        assert_eq!(updated.icon_id, "Download");

        assert!(!registry.update_shortcut("nope", ShortcutUpdate::default().name("Y")));
    }

    #[test]
    fn remove_twice_reports_false() {
        let (_, mut registry) = fresh();
        assert!(registry.remove_shortcut("3"));
        assert_eq!(registry.len(), 3);
        assert!(!registry.remove_shortcut("3"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn mutations_survive_reopen() {
        let (storage, mut registry) = fresh();
        let added = registry.add_shortcut(NewShortcut::new("Pi-hole", "http://pi.hole", "Shield"));
        registry.update_shortcut("1", ShortcutUpdate::default().url("http://media:8096"));
        registry.remove_shortcut("4");

        let reopened = ShortcutRegistry::open(storage);
        let list = reopened.list_shortcuts();
        assert_eq!(list.len(), 4);
        assert_eq!(list.last().map(|s| s.id.as_str()), Some(added.id.as_str()));
        assert_eq!(reopened.get("1").unwrap().url, "http://media:8096");
        assert!(reopened.get("4").is_none());
    }

    #[test]
    fn corrupt_record_falls_back_to_defaults() {
        let storage = Rc::new(MemoryStore::new());
        storage.set(SHORTCUTS_KEY, "not json at all").unwrap();
        let registry = ShortcutRegistry::open(storage);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn empty_list_is_kept_not_reseeded() {
        let storage = Rc::new(MemoryStore::new());
        storage.set(SHORTCUTS_KEY, "[]").unwrap();
        let registry = ShortcutRegistry::open(storage);
        assert!(registry.is_empty());
    }
}
