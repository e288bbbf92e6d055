//! Keyboard polling for two riders sharing one terminal.
//!
//! Key events update a held-key table; the session samples it once per tick.
//! Terminals without key-release events get a timeout instead: a key counts
//! as released once no press or repeat has arrived for a while.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::settings::Settings;
use crate::sim::{ControlState, PlayerSlot};

// Long enough to bridge the usual auto-repeat start delay.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u64 = 500;

/// Physical keys for one rider's logical controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub accelerate: KeyCode,
    pub brake: KeyCode,
    pub turn_left: KeyCode,
    pub turn_right: KeyCode,
    pub fire: KeyCode,
}

impl KeyBindings {
    pub fn for_slot(slot: PlayerSlot) -> Self {
        match slot {
            PlayerSlot::One => Self {
                accelerate: KeyCode::Char('w'),
                brake: KeyCode::Char('s'),
                turn_left: KeyCode::Char('a'),
                turn_right: KeyCode::Char('d'),
                fire: KeyCode::Char('f'),
            },
            PlayerSlot::Two => Self {
                accelerate: KeyCode::Up,
                brake: KeyCode::Down,
                turn_left: KeyCode::Left,
                turn_right: KeyCode::Right,
                fire: KeyCode::Enter,
            },
        }
    }

    fn sample(&self, held: impl Fn(KeyCode) -> bool) -> ControlState {
        ControlState {
            accelerate: held(self.accelerate),
            brake: held(self.brake),
            turn_left: held(self.turn_left),
            turn_right: held(self.turn_right),
            fire: held(self.fire),
        }
    }
}

/// One-shot commands outside the riders' controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Quit,
    /// Change sensitivity by this much
    AdjustSensitivity(f32),
}

#[derive(Debug, Clone)]
pub struct KeyboardInput {
    bindings: [KeyBindings; 2],
    held: HashMap<KeyCode, Instant>,
    release_events: bool,
    release_timeout: Duration,
}

impl KeyboardInput {
    /// `release_events`: the terminal reports key releases
    pub fn new(release_events: bool) -> Self {
        Self {
            bindings: PlayerSlot::BOTH.map(KeyBindings::for_slot),
            held: HashMap::new(),
            release_events,
            release_timeout: Duration::from_millis(DEFAULT_KEY_RELEASE_TIMEOUT_MS),
        }
    }

    pub fn with_release_timeout(mut self, timeout: Duration) -> Self {
        self.release_timeout = timeout;
        self
    }

    /// Record a key event. Returns a command for quit or sensitivity keys.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Command> {
        let code = normalize(key.code);
        match key.kind {
            KeyEventKind::Press => {
                if let Some(command) = command_for(code, key.modifiers) {
                    return Some(command);
                }
                self.held.insert(code, now);
            }
            KeyEventKind::Repeat => {
                self.held.insert(code, now);
            }
            KeyEventKind::Release => {
                self.held.remove(&code);
            }
        }
        None
    }

    /// Sample both riders' controls for this tick
    pub fn controls(&mut self, now: Instant) -> [ControlState; 2] {
        if !self.release_events {
            let timeout = self.release_timeout;
            self.held
                .retain(|_, last| now.saturating_duration_since(*last) <= timeout);
        }
        self.bindings
            .map(|b| b.sample(|code| self.held.contains_key(&code)))
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

fn command_for(code: KeyCode, modifiers: KeyModifiers) -> Option<Command> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Command::AdjustSensitivity(Settings::SENSITIVITY_STEP)),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Command::AdjustSensitivity(-Settings::SENSITIVITY_STEP)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn test_bindings_map_to_each_rider() {
        let now = Instant::now();
        let mut input = KeyboardInput::new(true);
        input.handle_key(key(KeyCode::Char('W'), KeyEventKind::Press), now);
        input.handle_key(key(KeyCode::Left, KeyEventKind::Press), now);
        input.handle_key(key(KeyCode::Enter, KeyEventKind::Press), now);

        let [one, two] = input.controls(now);
        assert!(one.accelerate && !one.fire);
        assert!(two.turn_left && two.fire && !two.accelerate);
    }

    #[test]
    fn test_release_event_clears_key() {
        let now = Instant::now();
        let mut input = KeyboardInput::new(true);
        input.handle_key(key(KeyCode::Char('f'), KeyEventKind::Press), now);
        assert!(input.controls(now)[0].fire);
        input.handle_key(key(KeyCode::Char('f'), KeyEventKind::Release), now);
        assert!(!input.controls(now)[0].fire);
    }

    #[test]
    fn test_held_until_timeout_without_release_events() {
        let start = Instant::now();
        let mut input = KeyboardInput::new(false).with_release_timeout(Duration::from_millis(100));
        input.handle_key(key(KeyCode::Char('d'), KeyEventKind::Press), start);

        assert!(input.controls(start + Duration::from_millis(50))[0].turn_right);
        input.handle_key(key(KeyCode::Char('d'), KeyEventKind::Repeat), start + Duration::from_millis(80));
        assert!(input.controls(start + Duration::from_millis(170))[0].turn_right);
        assert!(!input.controls(start + Duration::from_millis(300))[0].turn_right);
    }

    #[test]
    fn test_release_events_disable_timeout() {
        let start = Instant::now();
        let mut input = KeyboardInput::new(true).with_release_timeout(Duration::from_millis(10));
        input.handle_key(key(KeyCode::Up, KeyEventKind::Press), start);
        assert!(input.controls(start + Duration::from_secs(5))[1].accelerate);
    }

    #[test]
    fn test_commands() {
        let now = Instant::now();
        let mut input = KeyboardInput::new(true);
        assert_eq!(
            input.handle_key(key(KeyCode::Esc, KeyEventKind::Press), now),
            Some(Command::Quit)
        );
        assert_eq!(
            input.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), now),
            Some(Command::Quit)
        );
        assert_eq!(
            input.handle_key(key(KeyCode::Char('+'), KeyEventKind::Press), now),
            Some(Command::AdjustSensitivity(5.0))
        );
        assert_eq!(
            input.handle_key(key(KeyCode::Char('-'), KeyEventKind::Press), now),
            Some(Command::AdjustSensitivity(-5.0))
        );
        assert_eq!(input.handle_key(key(KeyCode::Char('w'), KeyEventKind::Press), now), None);
        // Command keys never count as held
        assert_eq!(input.controls(now), [
            ControlState {
                accelerate: true,
                ..ControlState::default()
            },
            ControlState::default()
        ]);
    }
}
