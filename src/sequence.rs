use crate::keys::KeyId;
use std::time::Duration;

/// One tap of a key followed by a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub key: KeyId,
    pub delay_after: Duration,
}

impl Step {
    pub fn new(key: KeyId, delay_after: Duration) -> Self {
        Self { key, delay_after }
    }
}

/// An ordered list of timed key taps. Playback order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// `a` four times with half a second after each, then a single `space`.
    pub fn literal() -> Self {
        let mut steps = vec![Step::new(KeyId::Char('a'), Duration::from_millis(500)); 4];
        steps.push(Step::new(KeyId::Space, Duration::ZERO));
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of every configured pause; the minimum wall-clock length of a run.
    pub fn total_delay(&self) -> Duration {
        self.steps.iter().map(|s| s.delay_after).sum()
    }
}
