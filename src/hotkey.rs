//! Global abort hotkey.
//!
//! Pressing the configured chord anywhere flips the cancellation channel to
//! `true`, which ends a pending click wait.

use crate::error::{CksError, Result};
use crate::keys::{KeyChord, KeyId};
use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use std::thread;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct AbortHotkey {
    // unregisters on drop
    _manager: GlobalHotKeyManager,
    hotkey: HotKey,
    chord: KeyChord,
}

impl AbortHotkey {
    pub fn register(chord: &KeyChord) -> Result<Self> {
        let hotkey = to_hotkey(chord)?;
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| CksError::hotkey(format!("failed to create hotkey manager: {e}")))?;
        manager
            .register(hotkey)
            .map_err(|e| CksError::hotkey(format!("failed to register '{chord}': {e}")))?;

        info!("abort hotkey '{}' registered", chord);
        Ok(Self {
            _manager: manager,
            hotkey,
            chord: chord.clone(),
        })
    }

    /// Forwards presses of the chord to `cancel` from a background thread.
    ///
    /// The thread ends once every receiver of `cancel` has been dropped.
    pub fn spawn_listener(&self, cancel: watch::Sender<bool>) {
        let id = self.hotkey.id();
        let chord = self.chord.clone();
        let receiver = GlobalHotKeyEvent::receiver();

        thread::spawn(move || {
            while !cancel.is_closed() {
                if let Ok(event) = receiver.try_recv() {
                    if event.id == id && event.state == HotKeyState::Pressed {
                        warn!("abort hotkey '{}' pressed", chord);
                        if cancel.send(true).is_err() {
                            break;
                        }
                    }
                }
                thread::sleep(POLL_INTERVAL);
            }
        });
    }
}

pub fn to_hotkey(chord: &KeyChord) -> Result<HotKey> {
    let mut modifiers = Modifiers::empty();
    for modifier in &chord.modifiers {
        modifiers |= match modifier {
            KeyId::Control => Modifiers::CONTROL,
            KeyId::Alt => Modifiers::ALT,
            KeyId::Shift => Modifiers::SHIFT,
            KeyId::Command => Modifiers::SUPER,
            other => {
                return Err(CksError::invalid_key_combination(
                    chord.to_string(),
                    format!("'{other}' is not a modifier"),
                ))
            }
        };
    }

    let code = to_code(chord.key).ok_or_else(|| {
        CksError::invalid_key_combination(
            chord.to_string(),
            format!("'{}' cannot be used as a global hotkey", chord.key),
        )
    })?;

    Ok(HotKey::new(Some(modifiers), code))
}

fn to_code(key: KeyId) -> Option<Code> {
    let code = match key {
        KeyId::Char(c) => match c.to_ascii_lowercase() {
            'a' => Code::KeyA,
            'b' => Code::KeyB,
            'c' => Code::KeyC,
            'd' => Code::KeyD,
            'e' => Code::KeyE,
            'f' => Code::KeyF,
            'g' => Code::KeyG,
            'h' => Code::KeyH,
            'i' => Code::KeyI,
            'j' => Code::KeyJ,
            'k' => Code::KeyK,
            'l' => Code::KeyL,
            'm' => Code::KeyM,
            'n' => Code::KeyN,
            'o' => Code::KeyO,
            'p' => Code::KeyP,
            'q' => Code::KeyQ,
            'r' => Code::KeyR,
            's' => Code::KeyS,
            't' => Code::KeyT,
            'u' => Code::KeyU,
            'v' => Code::KeyV,
            'w' => Code::KeyW,
            'x' => Code::KeyX,
            'y' => Code::KeyY,
            'z' => Code::KeyZ,
            '0' => Code::Digit0,
            '1' => Code::Digit1,
            '2' => Code::Digit2,
            '3' => Code::Digit3,
            '4' => Code::Digit4,
            '5' => Code::Digit5,
            '6' => Code::Digit6,
            '7' => Code::Digit7,
            '8' => Code::Digit8,
            '9' => Code::Digit9,
            _ => return None,
        },
        KeyId::Function(n) => match n {
            1 => Code::F1,
            2 => Code::F2,
            3 => Code::F3,
            4 => Code::F4,
            5 => Code::F5,
            6 => Code::F6,
            7 => Code::F7,
            8 => Code::F8,
            9 => Code::F9,
            10 => Code::F10,
            11 => Code::F11,
            12 => Code::F12,
            _ => return None,
        },
        KeyId::Space => Code::Space,
        KeyId::Enter => Code::Enter,
        KeyId::Tab => Code::Tab,
        KeyId::Escape => Code::Escape,
        KeyId::Backspace => Code::Backspace,
        KeyId::Up => Code::ArrowUp,
        KeyId::Down => Code::ArrowDown,
        KeyId::Left => Code::ArrowLeft,
        KeyId::Right => Code::ArrowRight,
        KeyId::Command | KeyId::Control | KeyId::Alt | KeyId::Shift => return None,
    };
    Some(code)
}
