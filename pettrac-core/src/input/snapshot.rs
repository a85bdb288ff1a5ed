//! Button state snapshots and transitions

use heapless::Vec;

use super::button::{Button, BUTTON_COUNT};

/// Pressed state of every button after a poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonSnapshot {
    pressed: [bool; BUTTON_COUNT],
}

/// Change of one button between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTransition {
    Pressed(Button),
    Released(Button),
}

impl ButtonSnapshot {
    /// Snapshot with every button released
    pub const fn released() -> Self {
        Self {
            pressed: [false; BUTTON_COUNT],
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed[button.index()]
    }

    pub fn set(&mut self, button: Button, pressed: bool) {
        self.pressed[button.index()] = pressed;
    }

    /// Buttons currently held, in channel order
    pub fn pressed_buttons(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL.into_iter().filter(|b| self.is_pressed(*b))
    }

    /// Transitions from `self` to `next`, in channel order
    pub fn transitions(&self, next: &ButtonSnapshot) -> Vec<ButtonTransition, BUTTON_COUNT> {
        let mut out = Vec::new();
        for button in Button::ALL {
            let transition = match (self.is_pressed(button), next.is_pressed(button)) {
                (false, true) => ButtonTransition::Pressed(button),
                (true, false) => ButtonTransition::Released(button),
                _ => continue,
            };
            // At most one transition per button, capacity is exact
            let _ = out.push(transition);
        }
        out
    }
}

/// Result of one sampler poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollResult {
    /// State of every channel after the poll
    pub snapshot: ButtonSnapshot,
    /// Channels that produced a debounce-qualified press this poll
    pub edges: Vec<Button, BUTTON_COUNT>,
}
