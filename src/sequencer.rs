use crate::error::Result;
use crate::injector::InputInjector;
use crate::sequence::Sequence;
use tracing::{debug, info};

/// Plays a [`Sequence`] against an injector, one step at a time.
pub struct InputSequencer<'a, I: ?Sized> {
    injector: &'a mut I,
}

impl<'a, I: InputInjector + ?Sized> InputSequencer<'a, I> {
    pub fn new(injector: &'a mut I) -> Self {
        Self { injector }
    }

    /// Taps every key in order and waits its configured delay before the next.
    ///
    /// Delays are lower bounds; host scheduling may stretch them. There is no
    /// way to stop a run once started. The first injection failure is
    /// returned as-is and the rest of the sequence is not played.
    pub async fn play(&mut self, sequence: &Sequence) -> Result<()> {
        info!(
            "playing {} steps ({:?} of pauses)",
            sequence.len(),
            sequence.total_delay()
        );

        for (index, step) in sequence.steps().iter().enumerate() {
            debug!("step {}: {} then {:?}", index, step.key, step.delay_after);
            self.injector.press_key(step.key)?;
            self.injector.release_key(step.key)?;
            if !step.delay_after.is_zero() {
                tokio::time::sleep(step.delay_after).await;
            }
        }

        info!("sequence complete");
        Ok(())
    }
}
