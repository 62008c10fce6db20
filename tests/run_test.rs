use click_key_sequencer::{
    CksError, Config, InputInjector, InputSequencer, KeyEvent, KeyId, MouseButton, Phase,
    PointerEventSource, PointerSubscription, Result, Runner, Sequence, TriggerEvent,
    TriggerListener,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

type Trace = Arc<Mutex<Vec<(KeyEvent, Instant)>>>;

#[derive(Clone, Default)]
struct RecordingInjector {
    trace: Trace,
}

impl RecordingInjector {
    fn events(&self) -> Vec<KeyEvent> {
        self.trace.lock().unwrap().iter().map(|(e, _)| *e).collect()
    }

    fn timed(&self) -> Vec<(KeyEvent, Instant)> {
        self.trace.lock().unwrap().clone()
    }
}

impl InputInjector for RecordingInjector {
    fn press_key(&mut self, key: KeyId) -> Result<()> {
        self.trace
            .lock()
            .unwrap()
            .push((KeyEvent::press(key), Instant::now()));
        Ok(())
    }

    fn release_key(&mut self, key: KeyId) -> Result<()> {
        self.trace
            .lock()
            .unwrap()
            .push((KeyEvent::release(key), Instant::now()));
        Ok(())
    }
}

/// Hands each subscriber the scripted events, then keeps the stream open
/// like a real OS hook would.
#[derive(Default)]
struct ScriptedPointer {
    events: Vec<TriggerEvent>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    senders: Mutex<Vec<mpsc::UnboundedSender<TriggerEvent>>>,
    injector_trace: Option<Trace>,
    seen_at_close: Arc<Mutex<Option<usize>>>,
}

impl PointerEventSource for ScriptedPointer {
    fn subscribe(&self) -> Result<PointerSubscription> {
        self.opened.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = mpsc::unbounded_channel();
        for event in &self.events {
            tx.send(*event).unwrap();
        }
        self.senders.lock().unwrap().push(tx);

        let closed = self.closed.clone();
        let trace = self.injector_trace.clone();
        let seen = self.seen_at_close.clone();
        Ok(PointerSubscription::new(rx, move || {
            closed.fetch_add(1, Ordering::SeqCst);
            if let Some(trace) = trace {
                *seen.lock().unwrap() = Some(trace.lock().unwrap().len());
            }
        }))
    }
}

fn click(x: f64, pressed: bool) -> TriggerEvent {
    TriggerEvent {
        x,
        y: 42.0,
        button: MouseButton::Left,
        pressed,
    }
}

fn literal_trace() -> Vec<KeyEvent> {
    let a = KeyId::Char('a');
    let mut expected = Vec::new();
    for _ in 0..4 {
        expected.push(KeyEvent::press(a));
        expected.push(KeyEvent::release(a));
    }
    expected.push(KeyEvent::press(KeyId::Space));
    expected.push(KeyEvent::release(KeyId::Space));
    expected
}

#[tokio::test(start_paused = true)]
async fn test_literal_sequence_order_and_spacing() {
    let mut injector = RecordingInjector::default();
    InputSequencer::new(&mut injector)
        .play(&Sequence::literal())
        .await
        .unwrap();

    assert_eq!(injector.events(), literal_trace());

    let timed = injector.timed();
    for pair in 0..4 {
        let release = timed[pair * 2 + 1].1;
        let next_press = timed[pair * 2 + 2].1;
        assert!(next_press - release >= Duration::from_millis(500));
    }
}

#[tokio::test(start_paused = true)]
async fn test_play_does_not_finish_early() {
    let mut injector = RecordingInjector::default();
    let start = Instant::now();
    InputSequencer::new(&mut injector)
        .play(&Sequence::literal())
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_secs(2));
    // the final space tap has no trailing pause
    let timed = injector.timed();
    assert_eq!(timed.last().unwrap().1 - start, elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_replay_is_deterministic() {
    let sequence = Sequence::literal();

    let mut first = RecordingInjector::default();
    InputSequencer::new(&mut first).play(&sequence).await.unwrap();
    let mut second = RecordingInjector::default();
    InputSequencer::new(&mut second).play(&sequence).await.unwrap();

    assert_eq!(first.events(), second.events());

    let mut both = RecordingInjector::default();
    let mut sequencer = InputSequencer::new(&mut both);
    sequencer.play(&sequence).await.unwrap();
    sequencer.play(&sequence).await.unwrap();
    let events = both.events();
    assert_eq!(events[..10], events[10..]);
}

#[tokio::test(start_paused = true)]
async fn test_auto_switch_never_subscribes() {
    let injector = RecordingInjector::default();
    let pointer = ScriptedPointer::default();
    let opened = pointer.opened.clone();
    let (_cancel_tx, cancel_rx) = watch::channel(false);

    let config = Config {
        auto_switch: true,
        ..Config::default()
    };
    let plan = config.build_plan().unwrap();

    let mut runner = Runner::new(injector.clone(), pointer, cancel_rx);
    assert_eq!(runner.run(&plan).await.unwrap(), Phase::Done);

    assert_eq!(opened.load(Ordering::SeqCst), 0);
    let mut expected = vec![
        KeyEvent::press(KeyId::Command),
        KeyEvent::press(KeyId::Tab),
        KeyEvent::release(KeyId::Tab),
        KeyEvent::release(KeyId::Command),
    ];
    expected.extend(literal_trace());
    assert_eq!(injector.events(), expected);
}

#[tokio::test(start_paused = true)]
async fn test_manual_mode_waits_for_release_before_any_injection() {
    let injector = RecordingInjector::default();
    let pointer = ScriptedPointer {
        events: vec![click(10.0, true), click(10.0, false)],
        injector_trace: Some(injector.trace.clone()),
        ..ScriptedPointer::default()
    };
    let seen = pointer.seen_at_close.clone();
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let plan = Config::default().build_plan().unwrap();

    let mut runner = Runner::new(injector.clone(), pointer, cancel_rx);
    assert_eq!(runner.run(&plan).await.unwrap(), Phase::Done);
    assert_eq!(runner.phase(), Phase::Done);

    // nothing was injected while the subscription was open
    assert_eq!(*seen.lock().unwrap(), Some(0));
    assert!(!injector.events().contains(&KeyEvent::press(KeyId::Command)));
    assert_eq!(injector.events(), literal_trace());
}

#[tokio::test(start_paused = true)]
async fn test_trigger_consumed_exactly_once() {
    let pointer = ScriptedPointer {
        events: vec![
            click(1.0, true),
            click(2.0, true),
            click(3.0, false),
            click(4.0, true),
            click(5.0, true),
        ],
        ..ScriptedPointer::default()
    };
    let (_cancel_tx, cancel_rx) = watch::channel(false);

    let mut listener = TriggerListener::new(&pointer, cancel_rx);
    let event = listener.wait_for_trigger().await.unwrap();

    assert_eq!(event.x, 3.0);
    assert!(!event.pressed);
    assert_eq!(pointer.opened.load(Ordering::SeqCst), 1);
    assert_eq!(pointer.closed.load(Ordering::SeqCst), 1);
    assert!(pointer.senders.lock().unwrap()[0].is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_play_starts_once_per_trigger() {
    let injector = RecordingInjector::default();
    let pointer = ScriptedPointer {
        events: vec![
            click(1.0, true),
            click(2.0, true),
            click(3.0, false),
            click(4.0, true),
            click(5.0, true),
        ],
        ..ScriptedPointer::default()
    };
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let plan = Config::default().build_plan().unwrap();

    Runner::new(injector.clone(), pointer, cancel_rx)
        .run(&plan)
        .await
        .unwrap();

    assert_eq!(injector.events(), literal_trace());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_wait_injects_nothing() {
    let injector = RecordingInjector::default();
    let pointer = ScriptedPointer {
        events: vec![click(1.0, true)],
        ..ScriptedPointer::default()
    };
    let closed = pointer.closed.clone();
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let plan = Config::default().build_plan().unwrap();

    let mut runner = Runner::new(injector.clone(), pointer, cancel_rx);
    let (result, _) = tokio::join!(runner.run(&plan), async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        cancel_tx.send(true).unwrap();
    });

    assert!(matches!(result, Err(CksError::Cancelled)));
    assert_eq!(runner.phase(), Phase::WaitingForTrigger);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert!(injector.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_injection_failure_propagates() {
    struct NoSession;

    impl InputInjector for NoSession {
        fn press_key(&mut self, key: KeyId) -> Result<()> {
            Err(CksError::injection(key.to_string(), "press", "no active session"))
        }

        fn release_key(&mut self, key: KeyId) -> Result<()> {
            Err(CksError::injection(key.to_string(), "release", "no active session"))
        }
    }

    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let config = Config {
        auto_switch: true,
        ..Config::default()
    };
    let plan = config.build_plan().unwrap();

    let mut runner = Runner::new(NoSession, ScriptedPointer::default(), cancel_rx);
    let err = runner.run(&plan).await.unwrap_err();

    assert!(matches!(err, CksError::Injection { .. }));
    assert_eq!(runner.phase(), Phase::FocusSwitching);
}
