//! Persisted dashboard state: accounts, session, shortcuts and wallpaper.

pub mod auth;
pub mod credentials;
pub mod shortcuts;
pub mod storage;
pub mod wallpaper;

use std::rc::Rc;

pub use auth::{AccessDenied, AuthGate, SessionState};
pub use credentials::{CredentialStore, ParseRoleError, Role, Upsert, UserSummary};
pub use shortcuts::{NewShortcut, Shortcut, ShortcutRegistry, ShortcutUpdate, SENTINEL_URL};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use wallpaper::{WallpaperConfig, WallpaperStore, DEFAULT_WALLPAPER};

/// Every store, opened over one shared backend. The presentation layer
/// receives this and nothing else.
pub struct Dashboard {
    pub auth: AuthGate,
    pub shortcuts: ShortcutRegistry,
    pub wallpaper: WallpaperStore,
}

impl Dashboard {
    pub fn open(storage: Rc<dyn KeyValueStore>) -> Self {
        Self {
            auth: AuthGate::open(storage.clone()),
            shortcuts: ShortcutRegistry::open(storage.clone()),
            wallpaper: WallpaperStore::open(storage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_share_one_backend() {
        let storage = Rc::new(MemoryStore::new());
        let mut dash = Dashboard::open(storage.clone());
        assert!(dash.auth.login("admin", "admin123"));
        dash.shortcuts
            .add_shortcut(NewShortcut::new("Router", "http://192.168.31.1", "Wifi"));
        dash.wallpaper.set_custom_wallpaper("data:image/png;base64,AA==");

        let reloaded = Dashboard::open(storage);
        assert_eq!(reloaded.auth.state(), SessionState::Authenticated(Role::Admin));
        assert_eq!(reloaded.shortcuts.len(), 5);
        assert!(reloaded.wallpaper.get_wallpaper().is_custom());
    }
}
