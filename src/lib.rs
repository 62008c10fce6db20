//! # Click Key Sequencer
//!
//! Plays a fixed, timed sequence of key taps into a desktop application,
//! started either by a mouse click or by an automatic window switch.
//!
//! ## Features
//!
//! - Manual start: wait for any mouse button release, then play
//! - Auto start: tap a focus-switch hotkey (default `cmd+tab`), then play
//! - Ordered steps with a minimum pause after each key tap
//! - Named key bindings, validated before anything is sent
//! - Global abort hotkey for a pending click wait
//! - JSON configuration file support
//!
//! ## Example
//!
//! ```no_run
//! use click_key_sequencer::{Config, EnigoInjector, RdevPointerSource, Runner};
//! use tokio::sync::watch;
//!
//! # async fn run() -> click_key_sequencer::Result<()> {
//! let plan = Config::default().build_plan()?;
//! let (_cancel_tx, cancel_rx) = watch::channel(false);
//!
//! let mut runner = Runner::new(EnigoInjector::new()?, RdevPointerSource::new(), cancel_rx);
//! runner.run(&plan).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```json
//! {
//!   "auto_switch": false,
//!   "bindings": { "accelerate": "a" },
//!   "sequence": [
//!     {"key": "accelerate", "delay_after": "500ms"},
//!     {"key": "space"}
//!   ]
//! }
//! ```

pub mod config;
pub mod error;
pub mod focus;
pub mod hotkey;
pub mod injector;
pub mod keys;
pub mod pointer;
pub mod process_finder;
pub mod runner;
pub mod sequence;
pub mod sequencer;
pub mod trigger;

pub use config::Config;
pub use error::{CksError, Result};
pub use focus::FocusSwitcher;
pub use hotkey::AbortHotkey;
pub use injector::{EnigoInjector, InputInjector};
pub use keys::{KeyAction, KeyChord, KeyEvent, KeyId};
pub use pointer::{MouseButton, PointerEventSource, PointerSubscription, RdevPointerSource, TriggerEvent};
pub use process_finder::ProcessFinder;
pub use runner::{Phase, RunPlan, Runner, StartMode};
pub use sequence::{Sequence, Step};
pub use sequencer::InputSequencer;
pub use trigger::TriggerListener;
