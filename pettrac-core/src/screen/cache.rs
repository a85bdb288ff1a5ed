//! Name-keyed screen cache

use std::collections::HashMap;

use log::debug;

use super::{Screen, ScreenFactory};

/// Screens constructed so far, never evicted
pub struct ScreenCache {
    factory: Box<dyn ScreenFactory>,
    screens: HashMap<String, Box<dyn Screen>>,
}

impl ScreenCache {
    pub fn new(factory: Box<dyn ScreenFactory>) -> Self {
        Self {
            factory,
            screens: HashMap::new(),
        }
    }

    /// Fetch `name`, constructing it on first use
    ///
    /// Returns `None` if the factory does not know the name.
    pub fn get_or_create(&mut self, name: &str) -> Option<&mut (dyn Screen + 'static)> {
        if !self.screens.contains_key(name) {
            let screen = self.factory.create(name)?;
            debug!("Created screen {}", name);
            self.screens.insert(name.to_string(), screen);
        }
        self.screens.get_mut(name).map(|s| s.as_mut())
    }

    /// Fetch an already constructed screen
    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Screen + 'static)> {
        self.screens.get_mut(name).map(|s| s.as_mut())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.screens.contains_key(name)
    }

    /// Number of constructed screens
    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }
}
