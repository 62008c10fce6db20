//! Semantic key identifiers, key events and hotkey chords.
//!
//! Keys are parsed from the same human-friendly names used in the
//! configuration file (`"a"`, `"space"`, `"cmd"`, `"f5"`) and rendered back
//! with their canonical name.

use crate::error::{CksError, Result};
use std::fmt;
use std::str::FromStr;

/// A keyboard key, independent of any input backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyId {
    /// A printable character.
    Char(char),
    Space,
    Tab,
    Enter,
    Escape,
    Backspace,
    /// The command / meta / super modifier.
    Command,
    Control,
    Alt,
    Shift,
    Up,
    Down,
    Left,
    Right,
    /// F1 through F12.
    Function(u8),
}

impl KeyId {
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            KeyId::Command | KeyId::Control | KeyId::Alt | KeyId::Shift
        )
    }
}

impl FromStr for KeyId {
    type Err = CksError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (None, _) => return Err(CksError::invalid_key(s, "empty key name")),
            (Some(c), None) => return Ok(KeyId::Char(c)),
            _ => {}
        }

        let name = trimmed.to_lowercase();
        let key = match name.as_str() {
            "space" => KeyId::Space,
            "tab" => KeyId::Tab,
            "enter" | "return" => KeyId::Enter,
            "esc" | "escape" => KeyId::Escape,
            "backspace" => KeyId::Backspace,
            "cmd" | "command" | "meta" | "super" | "win" => KeyId::Command,
            "ctrl" | "control" => KeyId::Control,
            "alt" | "option" => KeyId::Alt,
            "shift" => KeyId::Shift,
            "up" | "arrowup" => KeyId::Up,
            "down" | "arrowdown" => KeyId::Down,
            "left" | "arrowleft" => KeyId::Left,
            "right" | "arrowright" => KeyId::Right,
            other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                Some(n @ 1..=12) => KeyId::Function(n),
                _ => return Err(CksError::invalid_key(s, "unknown key name")),
            },
        };
        Ok(key)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Char(c) => write!(f, "{c}"),
            KeyId::Space => f.write_str("space"),
            KeyId::Tab => f.write_str("tab"),
            KeyId::Enter => f.write_str("enter"),
            KeyId::Escape => f.write_str("escape"),
            KeyId::Backspace => f.write_str("backspace"),
            KeyId::Command => f.write_str("cmd"),
            KeyId::Control => f.write_str("ctrl"),
            KeyId::Alt => f.write_str("alt"),
            KeyId::Shift => f.write_str("shift"),
            KeyId::Up => f.write_str("up"),
            KeyId::Down => f.write_str("down"),
            KeyId::Left => f.write_str("left"),
            KeyId::Right => f.write_str("right"),
            KeyId::Function(n) => write!(f, "f{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAction::Press => f.write_str("press"),
            KeyAction::Release => f.write_str("release"),
        }
    }
}

/// A single simulated press or release of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyId,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn press(key: KeyId) -> Self {
        Self {
            key,
            action: KeyAction::Press,
        }
    }

    pub fn release(key: KeyId) -> Self {
        Self {
            key,
            action: KeyAction::Release,
        }
    }
}

/// A hotkey such as `cmd+tab`: zero or more modifiers held around one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub modifiers: Vec<KeyId>,
    pub key: KeyId,
}

impl KeyChord {
    /// The injection order for the chord.
    ///
    /// Modifiers go down in declaration order, the key is tapped, then the
    /// modifiers come up in reverse order.
    pub fn events(&self) -> Vec<KeyEvent> {
        let mut events = Vec::with_capacity(self.modifiers.len() * 2 + 2);
        events.extend(self.modifiers.iter().copied().map(KeyEvent::press));
        events.push(KeyEvent::press(self.key));
        events.push(KeyEvent::release(self.key));
        events.extend(self.modifiers.iter().rev().copied().map(KeyEvent::release));
        events
    }
}

impl FromStr for KeyChord {
    type Err = CksError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(CksError::invalid_key_combination(s, "empty combination"));
        }

        let mut keys = Vec::new();
        for part in s.split('+') {
            if part.trim().is_empty() {
                return Err(CksError::invalid_key_combination(s, "empty key in combination"));
            }
            let key = part
                .parse::<KeyId>()
                .map_err(|e| CksError::invalid_key_combination(s, e.to_string()))?;
            keys.push(key);
        }

        // split() always yields at least one part
        let key = keys.pop().ok_or_else(|| CksError::invalid_key_combination(s, "no key"))?;
        if let Some(bad) = keys.iter().find(|k| !k.is_modifier()) {
            return Err(CksError::invalid_key_combination(
                s,
                format!("'{bad}' is not a modifier"),
            ));
        }

        Ok(Self {
            modifiers: keys,
            key,
        })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{modifier}+")?;
        }
        write!(f, "{}", self.key)
    }
}
