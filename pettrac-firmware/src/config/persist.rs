//! Write runtime setting changes back to the config file

use core::cell::RefCell;

use log::info;
use pettrac_core::config::Config;
use pettrac_core::events::{Event, EventHandler, EventPayload, ListenerError};

use super::loader::ConfigStore;

/// `setting_change` subscriber that keeps the config file current
///
/// Only brightness and rotation are persisted; debug mode is a session
/// toggle. The file is rewritten only when a stored value changes.
pub struct SettingsPersister {
    store: ConfigStore,
    config: RefCell<Config>,
}

impl SettingsPersister {
    pub fn new(store: ConfigStore, config: Config) -> Self {
        Self {
            store,
            config: RefCell::new(config),
        }
    }

    /// Configuration as last persisted
    pub fn config(&self) -> Config {
        self.config.borrow().clone()
    }
}

impl EventHandler for SettingsPersister {
    fn handle(&self, event: &mut Event) -> Result<(), ListenerError> {
        let EventPayload::SettingChange(setting) = event.payload() else {
            return Ok(());
        };

        let mut config = self.config.borrow_mut();
        if !config.apply_setting(setting) {
            return Ok(());
        }
        self.store.save(&config).map_err(ListenerError::failed)?;
        info!("Saved {:?} to {}", setting, self.store.path().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pettrac_core::events::Setting;
    use pettrac_display::Rotation;
    use std::fs;

    fn persister(name: &str) -> (SettingsPersister, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("pettrac-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let store = ConfigStore::new(dir.join("pettrac.toml"));
        let config = store.create_default().unwrap();
        (SettingsPersister::new(store, config), dir)
    }

    fn setting(setting: Setting) -> Event {
        Event::new(EventPayload::SettingChange(setting))
    }

    #[test]
    fn test_brightness_and_rotation_are_saved() {
        let (persister, dir) = persister("persist-save");

        persister.handle(&mut setting(Setting::Brightness(75))).unwrap();
        persister
            .handle(&mut setting(Setting::Rotation(Rotation::Deg90)))
            .unwrap();

        let reloaded = ConfigStore::new(dir.join("pettrac.toml"))
            .load()
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.display.brightness, 75);
        assert_eq!(reloaded.display.rotation, 90);
        assert_eq!(persister.config(), reloaded);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unchanged_setting_does_not_rewrite() {
        let (persister, dir) = persister("persist-noop");
        let path = dir.join("pettrac.toml");
        let before = fs::read_to_string(&path).unwrap();

        // 50 is already the stored brightness
        persister.handle(&mut setting(Setting::Brightness(50))).unwrap();
        persister.handle(&mut setting(Setting::DebugMode(true))).unwrap();

        // Still the commented default file
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_other_events_ignored() {
        let (persister, dir) = persister("persist-other");
        let mut event = Event::new(EventPayload::ConfigSave);
        assert!(persister.handle(&mut event).is_ok());
        assert!(!event.is_handled());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_failure_is_reported() {
        // A directory where the file should be makes the rename fail
        let dir = std::env::temp_dir().join(format!("pettrac-persist-fail-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("pettrac.toml")).unwrap();
        let persister = SettingsPersister::new(
            ConfigStore::new(dir.join("pettrac.toml")),
            Config::default(),
        );

        let result = persister.handle(&mut setting(Setting::Brightness(10)));

        assert!(matches!(result, Err(ListenerError::Failed(_))));
        let _ = fs::remove_dir_all(&dir);
    }
}
