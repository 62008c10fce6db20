use crate::error::{CksError, Result};
use crate::pointer::{PointerEventSource, TriggerEvent};
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// Blocks until a mouse button is released.
pub struct TriggerListener<S> {
    source: S,
    cancel: watch::Receiver<bool>,
}

impl<S: PointerEventSource> TriggerListener<S> {
    /// `cancel` aborts a pending wait once it holds `true`.
    pub fn new(source: S, cancel: watch::Receiver<bool>) -> Self {
        Self { source, cancel }
    }

    /// Waits for the first button release and returns it.
    ///
    /// Opens exactly one subscription and closes it before returning, whether
    /// the wait ends with a trigger, a cancellation, or an error. There is no
    /// timeout.
    pub async fn wait_for_trigger(&mut self) -> Result<TriggerEvent> {
        let mut subscription = self.source.subscribe()?;
        info!("waiting for a mouse click to start");

        loop {
            let event = tokio::select! {
                event = subscription.next() => event,
                _ = cancelled(&mut self.cancel) => {
                    debug!("trigger wait cancelled");
                    return Err(CksError::Cancelled);
                }
            };

            let Some(event) = event else {
                let reason = subscription.end_reason().unwrap_or_else(|| {
                    "pointer event stream ended before a click was released".to_string()
                });
                return Err(CksError::subscription(reason));
            };
            trace!("pointer event: {:?}", event);

            if !event.pressed {
                subscription.close();
                debug!(
                    "trigger: {:?} released at ({:.0}, {:.0})",
                    event.button, event.x, event.y
                );
                return Ok(event);
            }
        }
    }
}

/// Resolves once the flag is `true`. Never resolves if the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::{MouseButton, PointerSubscription};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    fn click(x: f64, pressed: bool) -> TriggerEvent {
        TriggerEvent {
            x,
            y: 0.0,
            button: MouseButton::Left,
            pressed,
        }
    }

    /// Hands out a subscription pre-loaded with `events`; keeps the sender
    /// alive when `hold_open` so the stream does not end.
    struct Scripted {
        events: Vec<TriggerEvent>,
        hold_open: bool,
        end_reason: Option<String>,
        opened: Arc<AtomicUsize>,
        closed: Arc<AtomicUsize>,
        sender: Mutex<Option<mpsc::UnboundedSender<TriggerEvent>>>,
    }

    impl Scripted {
        fn new(events: Vec<TriggerEvent>, hold_open: bool) -> Self {
            Self {
                events,
                hold_open,
                end_reason: None,
                opened: Arc::default(),
                closed: Arc::default(),
                sender: Mutex::new(None),
            }
        }
    }

    impl PointerEventSource for Scripted {
        fn subscribe(&self) -> Result<PointerSubscription> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            let (tx, rx) = mpsc::unbounded_channel();
            for e in &self.events {
                tx.send(*e).unwrap();
            }
            if self.hold_open {
                *self.sender.lock().unwrap() = Some(tx);
            }
            let closed = self.closed.clone();
            let reason = self.end_reason.clone();
            Ok(PointerSubscription::new(rx, move || {
                closed.fetch_add(1, Ordering::SeqCst);
            })
            .with_end_reason(move || reason.clone()))
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_release() {
        let source = Scripted::new(
            vec![click(1.0, true), click(2.0, true), click(3.0, false), click(4.0, false)],
            false,
        );
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let mut listener = TriggerListener::new(&source, cancel_rx);

        let event = listener.wait_for_trigger().await.unwrap();
        assert_eq!(event.x, 3.0);
        assert_eq!(source.opened.load(Ordering::SeqCst), 1);
        assert_eq!(source.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stream_end_is_subscription_failure() {
        let source = Scripted::new(vec![click(1.0, true)], false);
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let mut listener = TriggerListener::new(&source, cancel_rx);

        let err = listener.wait_for_trigger().await.unwrap_err();
        assert!(matches!(err, CksError::Subscription(_)));
        assert_eq!(source.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stream_end_reports_source_reason() {
        let mut source = Scripted::new(vec![click(1.0, true)], false);
        source.end_reason = Some("ListenError(1)".to_string());
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let mut listener = TriggerListener::new(&source, cancel_rx);

        match listener.wait_for_trigger().await {
            Err(CksError::Subscription(reason)) => assert_eq!(reason, "ListenError(1)"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(source.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_aborts_wait_and_releases() {
        let source = Scripted::new(vec![click(1.0, true)], true);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let mut listener = TriggerListener::new(&source, cancel_rx);

        let (result, _) = tokio::join!(listener.wait_for_trigger(), async {
            tokio::task::yield_now().await;
            cancel_tx.send(true).unwrap();
        });

        assert!(matches!(result, Err(CksError::Cancelled)));
        assert_eq!(source.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_already_cancelled_returns_immediately() {
        let source = Scripted::new(vec![], true);
        let (_cancel_tx, cancel_rx) = watch::channel(true);
        let mut listener = TriggerListener::new(&source, cancel_rx);

        assert!(matches!(
            listener.wait_for_trigger().await,
            Err(CksError::Cancelled)
        ));
    }
}
