//! Keyboard and touch mapping
//!
//! Raw events set held flags and one-shot requests; [`InputMapper::next_input`]
//! turns them into one [`TickInput`] per frame. Fire triggers on the press
//! and then repeats at a fixed interval while held.

use crate::sim::TickInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Left,
    Right,
    Fire,
    Confirm,
    Pause,
    /// Host-level sound toggle; never reaches the simulation
    Mute,
}

/// On-screen touch buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchRegion {
    Left,
    Right,
    Fire,
}

impl From<TouchRegion> for Action {
    fn from(region: TouchRegion) -> Self {
        match region {
            TouchRegion::Left => Action::Left,
            TouchRegion::Right => Action::Right,
            TouchRegion::Fire => Action::Fire,
        }
    }
}

/// Map a `KeyboardEvent.key` value to an action
pub fn action_for_key(key: &str) -> Option<Action> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(Action::Left),
        "ArrowRight" | "d" | "D" => Some(Action::Right),
        " " | "z" | "Z" => Some(Action::Fire),
        "Enter" => Some(Action::Confirm),
        "Escape" | "p" | "P" => Some(Action::Pause),
        "m" | "M" => Some(Action::Mute),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct InputMapper {
    left: bool,
    right: bool,
    fire_held: bool,
    fire_pressed: bool,
    confirm: bool,
    pause: bool,
    mute: bool,
    /// Auto-repeat interval while fire is held (None disables)
    repeat_ms: Option<f64>,
    next_repeat_ms: Option<f64>,
}

impl InputMapper {
    pub fn new(repeat_ms: Option<f64>) -> Self {
        Self {
            left: false,
            right: false,
            fire_held: false,
            fire_pressed: false,
            confirm: false,
            pause: false,
            mute: false,
            repeat_ms: repeat_ms.filter(|ms| *ms > 0.0),
            next_repeat_ms: None,
        }
    }

    pub fn press(&mut self, action: Action) {
        match action {
            Action::Left => self.left = true,
            Action::Right => self.right = true,
            Action::Fire => {
                // OS key repeat sends more keydowns; only the first counts
                if !self.fire_held {
                    self.fire_held = true;
                    self.fire_pressed = true;
                }
            }
            Action::Confirm => self.confirm = true,
            Action::Pause => self.pause = true,
            Action::Mute => self.mute = true,
        }
    }

    pub fn release(&mut self, action: Action) {
        match action {
            Action::Left => self.left = false,
            Action::Right => self.right = false,
            Action::Fire => {
                self.fire_held = false;
                self.next_repeat_ms = None;
            }
            Action::Confirm | Action::Pause | Action::Mute => {}
        }
    }

    /// Returns true if the key is bound (the host then suppresses the default)
    pub fn key_down(&mut self, key: &str) -> bool {
        match action_for_key(key) {
            Some(action) => {
                self.press(action);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match action_for_key(key) {
            Some(action) => {
                self.release(action);
                true
            }
            None => false,
        }
    }

    pub fn touch_start(&mut self, region: TouchRegion) {
        self.press(region.into());
    }

    pub fn touch_end(&mut self, region: TouchRegion) {
        self.release(region.into());
    }

    /// Drop every held and pending input (focus loss)
    pub fn clear(&mut self) {
        *self = Self::new(self.repeat_ms);
    }

    /// Input for the frame at `now_ms`; consumes one-shot requests.
    /// Held fire keeps asking until [`Self::shot_fired`] reports a volley,
    /// then waits one repeat interval.
    pub fn next_input(&mut self, now_ms: f64) -> TickInput {
        let repeat_due = self.fire_held
            && self.repeat_ms.is_some()
            && self.next_repeat_ms.is_none_or(|due| now_ms >= due);
        let input = TickInput {
            left: self.left,
            right: self.right,
            fire: self.fire_pressed || repeat_due,
            confirm: self.confirm,
            pause: self.pause,
        };
        self.fire_pressed = false;
        self.confirm = false;
        self.pause = false;
        input
    }

    /// Consume a pending mute toggle
    pub fn take_mute(&mut self) -> bool {
        std::mem::take(&mut self.mute)
    }

    /// The session accepted a volley at `now_ms`
    pub fn shot_fired(&mut self, now_ms: f64) {
        if self.fire_held {
            self.next_repeat_ms = self.repeat_ms.map(|interval| now_ms + interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(action_for_key("ArrowLeft"), Some(Action::Left));
        assert_eq!(action_for_key("d"), Some(Action::Right));
        assert_eq!(action_for_key(" "), Some(Action::Fire));
        assert_eq!(action_for_key("Enter"), Some(Action::Confirm));
        assert_eq!(action_for_key("Escape"), Some(Action::Pause));
        assert_eq!(action_for_key("M"), Some(Action::Mute));
        assert_eq!(action_for_key("q"), None);
    }

    #[test]
    fn test_movement_is_held() {
        let mut input = InputMapper::new(None);
        input.key_down("a");
        assert!(input.next_input(0.0).left);
        assert!(input.next_input(16.0).left);
        input.key_up("a");
        assert!(!input.next_input(32.0).left);
    }

    #[test]
    fn test_one_shots_consumed() {
        let mut input = InputMapper::new(None);
        input.key_down("Enter");
        input.key_down("p");
        let first = input.next_input(0.0);
        assert!(first.confirm && first.pause);
        let second = input.next_input(16.0);
        assert!(!second.confirm && !second.pause);
    }

    #[test]
    fn test_mute_is_taken_once() {
        let mut input = InputMapper::new(None);
        assert!(input.key_down("m"));
        assert_eq!(input.next_input(0.0), TickInput::default());
        assert!(input.take_mute());
        assert!(!input.take_mute());
    }

    #[test]
    fn test_fire_edge_without_repeat() {
        let mut input = InputMapper::new(None);
        input.key_down(" ");
        input.key_down(" ");
        assert!(input.next_input(0.0).fire);
        assert!(!input.next_input(500.0).fire);
    }

    #[test]
    fn test_fire_auto_repeat_while_held() {
        let mut input = InputMapper::new(Some(200.0));
        input.touch_start(TouchRegion::Fire);
        assert!(input.next_input(1000.0).fire);
        input.shot_fired(1000.0);
        assert!(!input.next_input(1100.0).fire);
        assert!(input.next_input(1200.0).fire);
        input.shot_fired(1200.0);
        assert!(!input.next_input(1300.0).fire);
        input.touch_end(TouchRegion::Fire);
        assert!(!input.next_input(1400.0).fire);
    }

    #[test]
    fn test_rejected_repeat_asks_again_next_frame() {
        let mut input = InputMapper::new(Some(200.0));
        input.key_down(" ");
        assert!(input.next_input(0.0).fire);
        input.shot_fired(0.0);
        // Still on cooldown at exactly 200ms, so nothing reports a shot
        assert!(input.next_input(200.0).fire);
        assert!(input.next_input(220.0).fire);
        input.shot_fired(220.0);
        assert!(!input.next_input(400.0).fire);
        assert!(input.next_input(420.0).fire);
    }

    #[test]
    fn test_clear_drops_held_state() {
        let mut input = InputMapper::new(Some(200.0));
        input.touch_start(TouchRegion::Left);
        input.touch_start(TouchRegion::Fire);
        input.clear();
        assert_eq!(input.next_input(0.0), TickInput::default());
    }
}
