use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use super::storage::{load_record, save_record, KeyValueStore, Loaded, WALLPAPER_KEY};

pub const DEFAULT_WALLPAPER: &str = "/wallpaper.jpg";

/// The active background. `uploaded_at` is present exactly when the image
/// was uploaded by the user; the constructors are the only way to build one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WallpaperConfig {
    url: String,
    is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uploaded_at: Option<DateTime<Utc>>,
}

impl WallpaperConfig {
    pub fn stock(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_custom: false,
            uploaded_at: None,
        }
    }

    pub fn custom(image_data: impl Into<String>, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            url: image_data.into(),
            is_custom: true,
            uploaded_at: Some(uploaded_at),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_custom(&self) -> bool {
        self.is_custom
    }

    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        self.uploaded_at
    }

    fn is_consistent(&self) -> bool {
        self.is_custom == self.uploaded_at.is_some()
    }
}

impl Default for WallpaperConfig {
    fn default() -> Self {
        Self::stock(DEFAULT_WALLPAPER)
    }
}

pub struct WallpaperStore {
    storage: Rc<dyn KeyValueStore>,
    current: WallpaperConfig,
}

impl WallpaperStore {
    pub fn open(storage: Rc<dyn KeyValueStore>) -> Self {
        let current = match load_record::<WallpaperConfig>(storage.as_ref(), WALLPAPER_KEY) {
            Loaded::Found(config) if config.is_consistent() => config,
            Loaded::Missing => WallpaperConfig::default(),
            Loaded::Found(_) | Loaded::Corrupt => {
                tracing::warn!("replacing unusable wallpaper record with the default");
                let config = WallpaperConfig::default();
                save_record(storage.as_ref(), WALLPAPER_KEY, &config);
                config
            }
        };
        Self { storage, current }
    }

    fn store(&mut self, config: WallpaperConfig) {
        save_record(self.storage.as_ref(), WALLPAPER_KEY, &config);
        self.current = config;
    }

    pub fn get_wallpaper(&self) -> WallpaperConfig {
        self.current.clone()
    }

    /// Stores an already validated image payload (usually a data URL).
    pub fn set_custom_wallpaper(&mut self, image_data: impl Into<String>) {
        self.set_custom_wallpaper_at(image_data, Utc::now());
    }

    pub fn set_custom_wallpaper_at(&mut self, image_data: impl Into<String>, at: DateTime<Utc>) {
        let config = WallpaperConfig::custom(image_data, at);
        tracing::info!(bytes = config.url.len(), "custom wallpaper set");
        self.store(config);
    }

    pub fn set_default_wallpaper(&mut self, url: impl Into<String>) {
        let config = WallpaperConfig::stock(url);
        tracing::info!(url = %config.url, "stock wallpaper set");
        self.store(config);
    }

    pub fn clear_custom_wallpaper(&mut self) {
        self.set_default_wallpaper(DEFAULT_WALLPAPER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use chrono::TimeZone;

    #[test]
    fn defaults_without_writing() {
        let storage = Rc::new(MemoryStore::new());
        let store = WallpaperStore::open(storage.clone());
        let wallpaper = store.get_wallpaper();
        assert_eq!(wallpaper.url(), DEFAULT_WALLPAPER);
        assert!(!wallpaper.is_custom());
        assert_eq!(wallpaper.uploaded_at(), None);
        assert_eq!(storage.get(WALLPAPER_KEY).unwrap(), None);
    }

    #[test]
    fn custom_then_clear() {
        let storage = Rc::new(MemoryStore::new());
        let mut store = WallpaperStore::open(storage);
        store.set_custom_wallpaper("data:image/png;base64,AAAA");
        let wallpaper = store.get_wallpaper();
        assert_eq!(wallpaper.url(), "data:image/png;base64,AAAA");
        assert!(wallpaper.is_custom());
        assert!(wallpaper.uploaded_at().is_some());

        store.clear_custom_wallpaper();
        let wallpaper = store.get_wallpaper();
        assert!(!wallpaper.is_custom());
        assert_eq!(wallpaper.url(), DEFAULT_WALLPAPER);
        assert_eq!(wallpaper.uploaded_at(), None);
    }

    #[test]
    fn persisted_record_shape() {
        let storage = Rc::new(MemoryStore::new());
        let mut store = WallpaperStore::open(storage.clone());
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        store.set_custom_wallpaper_at("data:x", at);

        let raw = storage.get(WALLPAPER_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["isCustom"], true);
        assert_eq!(value["uploadedAt"], "2024-03-01T12:00:00Z");

        store.set_default_wallpaper("https://example.com/bg.jpg");
        let raw = storage.get(WALLPAPER_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["url"], "https://example.com/bg.jpg");
        assert!(value.get("uploadedAt").is_none());
    }

    #[test]
    fn reopen_restores_custom_wallpaper() {
        let storage = Rc::new(MemoryStore::new());
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        WallpaperStore::open(storage.clone()).set_custom_wallpaper_at("data:y", at);
        let reopened = WallpaperStore::open(storage);
        assert_eq!(reopened.get_wallpaper(), WallpaperConfig::custom("data:y", at));
    }

    #[test]
    fn corrupt_record_is_overwritten_with_default() {
        let storage = Rc::new(MemoryStore::new());
        storage.set(WALLPAPER_KEY, "{{{").unwrap();
        let store = WallpaperStore::open(storage.clone());
        assert_eq!(store.get_wallpaper(), WallpaperConfig::default());
        let raw = storage.get(WALLPAPER_KEY).unwrap().unwrap();
        assert!(serde_json::from_str::<WallpaperConfig>(&raw).is_ok());
    }

    #[test]
    fn inconsistent_record_is_treated_as_corrupt() {
        let storage = Rc::new(MemoryStore::new());
        storage
            .set(WALLPAPER_KEY, r#"{"url":"data:z","isCustom":true}"#)
            .unwrap();
        let store = WallpaperStore::open(storage);
        assert_eq!(store.get_wallpaper(), WallpaperConfig::default());
    }
}
