//! The whole run, start to finish.
//!
//! ```text
//! Start -> FocusSwitching    -> Playing -> Done   (auto-switch)
//! Start -> WaitingForTrigger -> Playing -> Done   (manual)
//! ```
//!
//! There are no retry transitions. Any error ends the run where it happens.

use crate::error::Result;
use crate::focus::FocusSwitcher;
use crate::injector::InputInjector;
use crate::pointer::PointerEventSource;
use crate::sequence::Sequence;
use crate::sequencer::InputSequencer;
use crate::trigger::TriggerListener;
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

/// How playback is started. Fixed for the lifetime of a [`RunPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Tap the focus hotkey, then play immediately.
    AutoSwitch,
    /// Wait for a mouse button release, then play.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    FocusSwitching,
    WaitingForTrigger,
    Playing,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Start => "start",
            Phase::FocusSwitching => "focus-switching",
            Phase::WaitingForTrigger => "waiting-for-trigger",
            Phase::Playing => "playing",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// A validated, immutable description of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub mode: StartMode,
    pub focus: FocusSwitcher,
    pub sequence: Sequence,
}

pub struct Runner<I, P> {
    injector: I,
    pointer: P,
    cancel: watch::Receiver<bool>,
    phase: Phase,
}

impl<I: InputInjector, P: PointerEventSource> Runner<I, P> {
    pub fn new(injector: I, pointer: P, cancel: watch::Receiver<bool>) -> Self {
        Self {
            injector,
            pointer,
            cancel,
            phase: Phase::Start,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Drives the plan to [`Phase::Done`].
    ///
    /// Exactly one start path is taken: the focus chord in auto-switch mode,
    /// the click wait otherwise. The pointer source is never touched in
    /// auto-switch mode.
    pub async fn run(&mut self, plan: &RunPlan) -> Result<Phase> {
        match plan.mode {
            StartMode::AutoSwitch => {
                self.enter(Phase::FocusSwitching);
                plan.focus.switch_focus(&mut self.injector).await?;
            }
            StartMode::Manual => {
                self.enter(Phase::WaitingForTrigger);
                TriggerListener::new(&self.pointer, self.cancel.clone())
                    .wait_for_trigger()
                    .await?;
            }
        }

        self.enter(Phase::Playing);
        InputSequencer::new(&mut self.injector)
            .play(&plan.sequence)
            .await?;

        self.enter(Phase::Done);
        Ok(self.phase)
    }

    fn enter(&mut self, next: Phase) {
        debug!("{} -> {}", self.phase, next);
        self.phase = next;
    }
}
