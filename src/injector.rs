//! Synthetic keyboard input.
//!
//! [`InputInjector`] is the seam between the sequencing logic and the OS.
//! [`EnigoInjector`] is the real backend; tests substitute a recorder.

use crate::error::{CksError, Result};
use crate::keys::{KeyAction, KeyEvent, KeyId};
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use tracing::trace;

/// Sends key-down / key-up events to whatever window has focus.
pub trait InputInjector {
    fn press_key(&mut self, key: KeyId) -> Result<()>;

    fn release_key(&mut self, key: KeyId) -> Result<()>;

    fn send(&mut self, event: KeyEvent) -> Result<()> {
        match event.action {
            KeyAction::Press => self.press_key(event.key),
            KeyAction::Release => self.release_key(event.key),
        }
    }
}

impl<T: InputInjector + ?Sized> InputInjector for &mut T {
    fn press_key(&mut self, key: KeyId) -> Result<()> {
        (**self).press_key(key)
    }

    fn release_key(&mut self, key: KeyId) -> Result<()> {
        (**self).release_key(key)
    }
}

/// OS-level injector backed by `enigo`.
pub struct EnigoInjector {
    enigo: Enigo,
}

impl EnigoInjector {
    /// Connects to the platform input layer.
    ///
    /// Fails when no session is available (for example no display server).
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| CksError::injection("*", "connect", e.to_string()))?;
        Ok(Self { enigo })
    }

    fn send_direction(&mut self, key: KeyId, direction: Direction) -> Result<()> {
        let action = match direction {
            Direction::Press => KeyAction::Press,
            _ => KeyAction::Release,
        };
        trace!("inject {} {}", action, key);
        let mapped = to_enigo_key(key, action)?;
        self.enigo
            .key(mapped, direction)
            .map_err(|e| CksError::injection(key.to_string(), action.to_string(), e.to_string()))
    }
}

impl InputInjector for EnigoInjector {
    fn press_key(&mut self, key: KeyId) -> Result<()> {
        self.send_direction(key, Direction::Press)
    }

    fn release_key(&mut self, key: KeyId) -> Result<()> {
        self.send_direction(key, Direction::Release)
    }
}

fn to_enigo_key(key: KeyId, action: KeyAction) -> Result<Key> {
    let mapped = match key {
        KeyId::Char(c) => Key::Unicode(c),
        KeyId::Space => Key::Space,
        KeyId::Tab => Key::Tab,
        KeyId::Enter => Key::Return,
        KeyId::Escape => Key::Escape,
        KeyId::Backspace => Key::Backspace,
        KeyId::Command => Key::Meta,
        KeyId::Control => Key::Control,
        KeyId::Alt => Key::Alt,
        KeyId::Shift => Key::Shift,
        KeyId::Up => Key::UpArrow,
        KeyId::Down => Key::DownArrow,
        KeyId::Left => Key::LeftArrow,
        KeyId::Right => Key::RightArrow,
        KeyId::Function(n) => match n {
            1 => Key::F1,
            2 => Key::F2,
            3 => Key::F3,
            4 => Key::F4,
            5 => Key::F5,
            6 => Key::F6,
            7 => Key::F7,
            8 => Key::F8,
            9 => Key::F9,
            10 => Key::F10,
            11 => Key::F11,
            12 => Key::F12,
            _ => {
                return Err(CksError::injection(
                    key.to_string(),
                    action.to_string(),
                    "unsupported key",
                ))
            }
        },
    };
    Ok(mapped)
}
