use crate::error::Result;
use crate::injector::InputInjector;
use crate::keys::KeyChord;
use std::time::Duration;
use tracing::{debug, info};

/// Brings the target window forward by tapping a window-switch hotkey.
///
/// Fire-and-forget: nothing checks which window ended up focused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusSwitcher {
    chord: KeyChord,
    settle: Duration,
}

impl FocusSwitcher {
    /// `settle` is a pause after the chord has been fully released.
    pub fn new(chord: KeyChord, settle: Duration) -> Self {
        Self { chord, settle }
    }

    pub fn chord(&self) -> &KeyChord {
        &self.chord
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    pub async fn switch_focus<I: InputInjector + ?Sized>(&self, injector: &mut I) -> Result<()> {
        info!("switching focus with {}", self.chord);
        for event in self.chord.events() {
            injector.send(event)?;
        }
        if !self.settle.is_zero() {
            debug!("letting focus settle for {:?}", self.settle);
            tokio::time::sleep(self.settle).await;
        }
        Ok(())
    }
}
