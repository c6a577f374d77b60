//! Input events and keyboard state
//!
//! Windowing is outside the engine. Whatever owns the window implements
//! [`EventSource`] and hands over the frame's events in arrival order.

pub mod controllable;

use std::collections::{HashSet, VecDeque};

pub use controllable::{ControlSystem, Controllable};

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// W key
    W,
    /// A key
    A,
    /// S key
    S,
    /// D key
    D,
    /// Q key
    Q,
    /// E key
    E,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// A discrete input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Key went down
    KeyPressed(KeyCode),
    /// Key went up
    KeyReleased(KeyCode),
    /// Cursor moved, in window coordinates
    MouseMoved {
        /// Horizontal position
        x: f64,
        /// Vertical position
        y: f64,
    },
    /// The window was closed
    Quit,
}

/// Per-frame supplier of input events
pub trait EventSource {
    /// Events received since the last poll, oldest first
    fn poll_events(&mut self) -> Vec<InputEvent>;
}

/// Event source replaying a fixed script, one batch per poll
///
/// Once the script runs out every poll returns nothing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    frames: VecDeque<Vec<InputEvent>>,
}

impl ScriptedEvents {
    /// Create a source from per-frame batches
    pub fn new(frames: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Script `frames` empty frames followed by a quit
    pub fn quit_after(frames: usize) -> Self {
        let mut script: Vec<Vec<InputEvent>> = vec![Vec::new(); frames];
        script.push(vec![InputEvent::Quit]);
        Self::new(script)
    }

    /// Batches not yet polled
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl EventSource for ScriptedEvents {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Which keys are currently held
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<KeyCode>,
    cursor: Option<(f64, f64)>,
}

impl KeyboardState {
    /// Create an empty keyboard state
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the state
    pub fn handle_event(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyPressed(key) => {
                self.pressed.insert(key);
            }
            InputEvent::KeyReleased(key) => {
                self.pressed.remove(&key);
            }
            InputEvent::MouseMoved { x, y } => self.cursor = Some((x, y)),
            InputEvent::Quit => {}
        }
    }

    /// Whether `key` is held
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Last cursor position
    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    /// Release every key
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_tracks_presses() {
        let mut keyboard = KeyboardState::new();
        keyboard.handle_event(&InputEvent::KeyPressed(KeyCode::W));
        keyboard.handle_event(&InputEvent::KeyPressed(KeyCode::D));
        keyboard.handle_event(&InputEvent::KeyReleased(KeyCode::W));
        keyboard.handle_event(&InputEvent::MouseMoved { x: 3.0, y: 4.0 });

        assert!(!keyboard.is_pressed(KeyCode::W));
        assert!(keyboard.is_pressed(KeyCode::D));
        assert_eq!(keyboard.cursor(), Some((3.0, 4.0)));

        keyboard.clear();
        assert!(!keyboard.is_pressed(KeyCode::D));
    }

    #[test]
    fn test_scripted_events_preserve_order() {
        let mut source = ScriptedEvents::new(vec![
            vec![InputEvent::KeyPressed(KeyCode::A), InputEvent::KeyReleased(KeyCode::A)],
            vec![],
        ]);

        assert_eq!(
            source.poll_events(),
            vec![InputEvent::KeyPressed(KeyCode::A), InputEvent::KeyReleased(KeyCode::A)]
        );
        assert!(source.poll_events().is_empty());
        assert!(source.poll_events().is_empty());
        assert_eq!(source.remaining(), 0);

        let mut quitting = ScriptedEvents::quit_after(2);
        assert_eq!(quitting.remaining(), 3);
        quitting.poll_events();
        quitting.poll_events();
        assert_eq!(quitting.poll_events(), vec![InputEvent::Quit]);
    }
}
