//! Logical buttons

use core::fmt;

/// Number of logical buttons on the keypad
pub const BUTTON_COUNT: usize = 8;

/// Logical button
///
/// Joystick directions plus centre press, and the three side keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Press,
    Key1,
    Key2,
    Key3,
}

impl Button {
    /// Every button, in channel order
    pub const ALL: [Button; BUTTON_COUNT] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::Press,
        Button::Key1,
        Button::Key2,
        Button::Key3,
    ];

    /// Dense index for per-button tables
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Button::Up => "up",
            Button::Down => "down",
            Button::Left => "left",
            Button::Right => "right",
            Button::Press => "press",
            Button::Key1 => "key1",
            Button::Key2 => "key2",
            Button::Key3 => "key3",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_lookup() {
        for button in Button::ALL {
            assert_eq!(Button::from_name(button.name()), Some(button));
        }
        assert_eq!(Button::from_name("key4"), None);
    }

    #[test]
    fn test_indices_match_order() {
        for (i, button) in Button::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
    }
}
