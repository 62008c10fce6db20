//! Pointer (mouse button) events and subscriptions to them.
//!
//! A [`PointerEventSource`] hands out [`PointerSubscription`] handles. The
//! handle owns the registration: closing it, or simply dropping it on any
//! exit path, tears the registration down exactly once.

use crate::error::{CksError, Result};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u8),
}

/// A mouse button transition at a screen position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEvent {
    pub x: f64,
    pub y: f64,
    pub button: MouseButton,
    pub pressed: bool,
}

pub trait PointerEventSource {
    /// Registers a new observer. Events flow until the handle is closed.
    fn subscribe(&self) -> Result<PointerSubscription>;
}

impl<T: PointerEventSource + ?Sized> PointerEventSource for &T {
    fn subscribe(&self) -> Result<PointerSubscription> {
        (**self).subscribe()
    }
}

type ReleaseHook = Box<dyn FnOnce() + Send>;
type EndReason = Box<dyn Fn() -> Option<String> + Send>;

/// A live registration with a pointer event source.
pub struct PointerSubscription {
    events: mpsc::UnboundedReceiver<TriggerEvent>,
    release: Option<ReleaseHook>,
    end_reason: Option<EndReason>,
}

impl PointerSubscription {
    /// `release` runs once, on [`close`](Self::close) or on drop.
    pub fn new(
        events: mpsc::UnboundedReceiver<TriggerEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            events,
            release: Some(Box::new(release)),
            end_reason: None,
        }
    }

    /// Lets the source explain why the stream stopped delivering events.
    pub fn with_end_reason(
        mut self,
        reason: impl Fn() -> Option<String> + Send + 'static,
    ) -> Self {
        self.end_reason = Some(Box::new(reason));
        self
    }

    /// Why the source went away, if it said so.
    pub fn end_reason(&self) -> Option<String> {
        self.end_reason.as_ref().and_then(|reason| reason())
    }

    /// Next event, or `None` once the source has gone away.
    pub async fn next(&mut self) -> Option<TriggerEvent> {
        self.events.recv().await
    }

    /// Unsubscribes explicitly.
    pub fn close(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            self.events.close();
            release();
        }
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

#[derive(Default)]
struct HookState {
    subscriber: Option<mpsc::UnboundedSender<TriggerEvent>>,
    last_position: (f64, f64),
    failure: Option<String>,
}

/// Global mouse hook backed by `rdev::listen`.
///
/// The OS hook is installed on the first [`subscribe`](PointerEventSource::subscribe)
/// call and lives on a dedicated thread for the rest of the process. Events
/// are only forwarded while a subscription is open.
#[derive(Clone, Default)]
pub struct RdevPointerSource {
    state: Arc<Mutex<HookState>>,
    started: Arc<OnceLock<()>>,
}

impl RdevPointerSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_hook(&self) {
        let state = self.state.clone();
        self.started.get_or_init(move || {
            thread::spawn(move || {
                let callback_state = state.clone();
                let result = rdev::listen(move |event| forward(&callback_state, event.event_type));

                // listen() only returns on failure
                let reason = match result {
                    Ok(()) => "pointer hook exited".to_string(),
                    Err(e) => format!("{e:?}"),
                };
                error!("pointer listener stopped: {}", reason);
                record_failure(&state, reason);
            });
        });
    }
}

/// Stores the hook failure and closes any open subscription's stream.
fn record_failure(state: &Mutex<HookState>, reason: String) {
    if let Ok(mut guard) = state.lock() {
        guard.failure = Some(reason);
        guard.subscriber = None;
    }
}

impl PointerEventSource for RdevPointerSource {
    fn subscribe(&self) -> Result<PointerSubscription> {
        self.start_hook();

        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut guard = self
                .state
                .lock()
                .map_err(|_| CksError::subscription("pointer state poisoned"))?;
            if let Some(reason) = &guard.failure {
                return Err(CksError::subscription(reason.clone()));
            }
            if guard.subscriber.is_some() {
                return Err(CksError::subscription("a subscription is already open"));
            }
            guard.subscriber = Some(tx);
        }
        debug!("pointer subscription opened");

        let state = self.state.clone();
        let failure_state = self.state.clone();
        Ok(PointerSubscription::new(rx, move || {
            if let Ok(mut guard) = state.lock() {
                guard.subscriber = None;
            }
            debug!("pointer subscription closed");
        })
        .with_end_reason(move || {
            failure_state
                .lock()
                .ok()
                .and_then(|guard| guard.failure.clone())
        }))
    }
}

fn forward(state: &Mutex<HookState>, event_type: rdev::EventType) {
    let Ok(mut guard) = state.lock() else {
        return;
    };
    let (button, pressed) = match event_type {
        rdev::EventType::MouseMove { x, y } => {
            guard.last_position = (x, y);
            return;
        }
        rdev::EventType::ButtonPress(b) => (b, true),
        rdev::EventType::ButtonRelease(b) => (b, false),
        _ => return,
    };
    let (x, y) = guard.last_position;
    let event = TriggerEvent {
        x,
        y,
        button: convert_button(button),
        pressed,
    };
    if let Some(tx) = &guard.subscriber {
        // a closed receiver means the subscriber is mid-teardown
        let _ = tx.send(event);
    }
}

fn convert_button(button: rdev::Button) -> MouseButton {
    match button {
        rdev::Button::Left => MouseButton::Left,
        rdev::Button::Right => MouseButton::Right,
        rdev::Button::Middle => MouseButton::Middle,
        rdev::Button::Unknown(code) => MouseButton::Other(code),
    }
}
