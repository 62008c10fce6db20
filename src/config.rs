//! JSON configuration.
//!
//! Every field has a default, and the defaults reproduce the stock run:
//! wait for a click, then tap `a` four times half a second apart and finish
//! with `space`.
//!
//! ```json
//! {
//!   "auto_switch": false,
//!   "focus_hotkey": "cmd+tab",
//!   "bindings": { "accelerate": "a" },
//!   "sequence": [
//!     { "key": "accelerate", "delay_after": "500ms" },
//!     { "key": "space" }
//!   ]
//! }
//! ```

use crate::error::{CksError, Result};
use crate::focus::FocusSwitcher;
use crate::keys::{KeyChord, KeyId};
use crate::runner::{RunPlan, StartMode};
use crate::sequence::{Sequence, Step};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;

const DEFAULT_FOCUS_HOTKEY: &str = "cmd+tab";
const DEFAULT_ABORT_HOTKEY: &str = "ctrl+alt+q";
const DEFAULT_STEP_DELAY_MS: u64 = 500;
const DEFAULT_STEP_REPEATS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Switch windows with `focus_hotkey` instead of waiting for a click.
    #[serde(default)]
    pub auto_switch: bool,

    #[serde(default = "default_focus_hotkey")]
    pub focus_hotkey: String,

    /// Pause between the focus chord and the first step. Whole milliseconds.
    #[serde(default, with = "duration_format")]
    pub focus_settle: Duration,

    /// Named actions mapped to keys. Every entry must carry a key.
    #[serde(default = "default_bindings")]
    pub bindings: BTreeMap<String, Option<String>>,

    #[serde(default = "default_sequence")]
    pub sequence: Vec<KeyStep>,

    /// Global chord that aborts a pending click wait. `null` disables it.
    #[serde(default = "default_abort_hotkey")]
    pub abort_hotkey: Option<String>,

    /// Process expected to receive the keys; only checked for presence.
    #[serde(default)]
    pub target_process: Option<String>,

    #[serde(default)]
    pub verbose: bool,
}

/// A key (or binding name) and the pause that follows it.
///
/// Durations are kept in whole milliseconds, the resolution of the file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStep {
    pub key: String,
    #[serde(default, with = "duration_format")]
    pub delay_after: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_switch: false,
            focus_hotkey: default_focus_hotkey(),
            focus_settle: Duration::ZERO,
            bindings: default_bindings(),
            sequence: default_sequence(),
            abort_hotkey: default_abort_hotkey(),
            target_process: None,
            verbose: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CksError::config_load(path, e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| CksError::config_load(path, e.to_string()))
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| CksError::config_save(path, e.to_string()))
    }

    pub fn start_mode(&self) -> StartMode {
        if self.auto_switch {
            StartMode::AutoSwitch
        } else {
            StartMode::Manual
        }
    }

    /// Checks everything a run depends on, so that a bad config is rejected
    /// before any key is sent.
    pub fn validate(&self) -> Result<()> {
        if self.sequence.is_empty() {
            return Err(CksError::config_validation("sequence cannot be empty"));
        }

        for name in self.bindings.keys() {
            self.resolve_key(name)?;
        }

        for (index, step) in self.sequence.iter().enumerate() {
            self.resolve_key(&step.key)
                .map_err(|e| CksError::config_validation(format!("sequence step {index}: {e}")))?;
        }

        check_millis("focus_settle", self.focus_settle)?;
        for (index, step) in self.sequence.iter().enumerate() {
            check_millis(&format!("sequence step {index} delay_after"), step.delay_after)?;
        }

        self.focus_hotkey
            .parse::<KeyChord>()
            .map_err(|e| CksError::config_validation(format!("focus_hotkey: {e}")))?;

        if let Some(abort) = &self.abort_hotkey {
            abort
                .parse::<KeyChord>()
                .map_err(|e| CksError::config_validation(format!("abort_hotkey: {e}")))?;
        }

        if let Some(process) = &self.target_process {
            if process.trim().is_empty() {
                return Err(CksError::config_validation(
                    "target_process cannot be empty when set",
                ));
            }
        }

        Ok(())
    }

    /// Looks `name` up in `bindings` first, then parses it as a key.
    pub fn resolve_key(&self, name: &str) -> Result<KeyId> {
        match self.bindings.get(name) {
            Some(Some(value)) if !value.trim().is_empty() => value
                .parse()
                .map_err(|e| CksError::config_validation(format!("binding '{name}': {e}"))),
            Some(_) => Err(CksError::config_validation(format!(
                "binding '{name}' has no key assigned"
            ))),
            None => name.parse(),
        }
    }

    pub fn build_sequence(&self) -> Result<Sequence> {
        let steps = self
            .sequence
            .iter()
            .map(|step| -> Result<Step> {
                Ok(Step::new(self.resolve_key(&step.key)?, step.delay_after))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Sequence::new(steps))
    }

    pub fn focus_switcher(&self) -> Result<FocusSwitcher> {
        let chord = self.focus_hotkey.parse()?;
        Ok(FocusSwitcher::new(chord, self.focus_settle))
    }

    /// Validates and freezes the config into an immutable plan.
    pub fn build_plan(&self) -> Result<RunPlan> {
        self.validate()?;
        Ok(RunPlan {
            mode: self.start_mode(),
            focus: self.focus_switcher()?,
            sequence: self.build_sequence()?,
        })
    }
}

/// Rejects durations the JSON form cannot represent.
fn check_millis(field: &str, duration: Duration) -> Result<()> {
    if duration.subsec_nanos() % 1_000_000 != 0 {
        return Err(CksError::config_validation(format!(
            "{field}: {duration:?} is finer than whole milliseconds"
        )));
    }
    Ok(())
}

fn default_focus_hotkey() -> String {
    DEFAULT_FOCUS_HOTKEY.to_string()
}

fn default_abort_hotkey() -> Option<String> {
    Some(DEFAULT_ABORT_HOTKEY.to_string())
}

fn default_bindings() -> BTreeMap<String, Option<String>> {
    BTreeMap::from([("accelerate".to_string(), Some("a".to_string()))])
}

fn default_sequence() -> Vec<KeyStep> {
    let mut steps = vec![
        KeyStep {
            key: "accelerate".to_string(),
            delay_after: Duration::from_millis(DEFAULT_STEP_DELAY_MS),
        };
        DEFAULT_STEP_REPEATS
    ];
    steps.push(KeyStep {
        key: "space".to_string(),
        delay_after: Duration::ZERO,
    });
    steps
}

/// Parses `"500ms"`, `"2s"`, `"1m"` or a bare number of milliseconds.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(CksError::invalid_duration(value, "empty duration"));
    }
    if normalized.starts_with('-') {
        return Err(CksError::invalid_duration(value, "duration cannot be negative"));
    }

    let split = normalized
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(normalized.len());
    let (digits, unit) = normalized.split_at(split);
    if digits.is_empty() {
        return Err(CksError::invalid_duration(value, "missing number"));
    }
    let amount: u64 = digits
        .parse()
        .map_err(|_| CksError::invalid_duration(value, "number out of range"))?;

    match unit.trim() {
        "" | "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => amount
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| CksError::invalid_duration(value, "number out of range")),
        other => Err(CksError::invalid_duration(
            value,
            format!("unknown unit '{other}'"),
        )),
    }
}

/// Renders a duration the way [`parse_duration`] reads it.
///
/// Resolution is one millisecond; any sub-millisecond remainder is dropped.
/// [`Config::validate`] rejects such durations so nothing is lost on save.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis != 0 && millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{millis}ms")
    }
}

mod duration_format {
    use super::{format_duration, parse_duration};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
