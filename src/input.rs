//! Logical input snapshot
//!
//! The mapping from physical keys to actions belongs to the platform layer.
//! The simulation only sees which actions are held this frame and which
//! were pressed since the previous frame.

/// A logical action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    /// Jump in the platformer, shoot in the shooter
    Fire,
    /// Run faster (platformer)
    Sprint,
    Pause,
    Confirm,
    Cancel,
}

impl Action {
    #[inline]
    fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Compact set of actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet(u16);

impl ActionSet {
    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }
}

/// Input state for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// Actions currently held down
    pub held: ActionSet,
    /// Actions that went down since the previous frame
    pub pressed: ActionSet,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: mark an action as held
    pub fn hold(mut self, action: Action) -> Self {
        self.held.insert(action);
        self
    }

    /// Builder: mark an action as just pressed (pressing also holds it)
    pub fn press(mut self, action: Action) -> Self {
        self.pressed.insert(action);
        self.held.insert(action);
        self
    }

    #[inline]
    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(action)
    }

    #[inline]
    pub fn was_pressed(&self, action: Action) -> bool {
        self.pressed.contains(action)
    }

    /// Horizontal axis from held left/right (-1, 0, 1). Left wins ties.
    pub fn horizontal(&self) -> f32 {
        if self.is_held(Action::Left) {
            -1.0
        } else if self.is_held(Action::Right) {
            1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_implies_held() {
        let input = InputSnapshot::new().press(Action::Confirm);
        assert!(input.was_pressed(Action::Confirm));
        assert!(input.is_held(Action::Confirm));
        assert!(!input.was_pressed(Action::Cancel));
    }

    #[test]
    fn hold_leaves_presses_empty() {
        let input = InputSnapshot::new().hold(Action::Fire).hold(Action::Left);
        assert!(input.is_held(Action::Fire));
        assert!(input.is_held(Action::Left));
        assert_eq!(input.pressed, ActionSet::default());
    }

    #[test]
    fn action_bits_are_distinct() {
        let mut set = ActionSet::default();
        set.insert(Action::Pause);
        assert!(set.contains(Action::Pause));
        for other in [Action::Left, Action::Fire, Action::Confirm, Action::Cancel] {
            assert!(!set.contains(other));
        }
    }

    #[test]
    fn horizontal_axis() {
        assert_eq!(InputSnapshot::new().hold(Action::Right).horizontal(), 1.0);
        assert_eq!(InputSnapshot::new().hold(Action::Left).hold(Action::Right).horizontal(), -1.0);
        assert_eq!(InputSnapshot::new().horizontal(), 0.0);
    }
}
