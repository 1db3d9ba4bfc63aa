use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait GameEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<GameEvent>,
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        let input_tx = tx.clone();
        thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if input_tx.send(GameEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if input_tx.send(GameEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { tx, rx }
    }

    /// Sender for additional event producers (the per-round ticker).
    pub fn sender(&self) -> Sender<GameEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Handle to a background tick thread, canceled when the handle is dropped.
///
/// Acquired when a round starts and released on every exit path (round stop,
/// back navigation, reset, app teardown); dropping the handle is the release,
/// so no path can leak a ticking thread that keeps pumping events after the
/// round has ended. The thread checks the flag before every send and also
/// exits once the receiving side is gone.
pub struct TickerGuard {
    stop: Arc<AtomicBool>,
}

impl TickerGuard {
    pub fn spawn(interval: Duration, tx: Sender<GameEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        thread::spawn(move || loop {
            if flag.load(Ordering::Relaxed) {
                break;
            }
            if tx.send(GameEvent::Tick).is_err() {
                break;
            }
            thread::sleep(interval);
        });

        Self { stop }
    }

    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl GameEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: GameEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: GameEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> GameEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            GameEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            GameEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn ticker_guard_emits_ticks_while_alive() {
        let (tx, rx) = mpsc::channel();
        let _guard = TickerGuard::spawn(Duration::from_millis(5), tx);

        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(GameEvent::Tick) => {}
            other => panic!("expected a tick, got {:?}", other.ok()),
        }
    }

    #[test]
    fn ticker_guard_stops_on_drop() {
        let (tx, rx) = mpsc::channel();
        let guard = TickerGuard::spawn(Duration::from_millis(5), tx);
        drop(guard);

        // Let the thread observe the flag, then flush whatever was in flight.
        std::thread::sleep(Duration::from_millis(25));
        while rx.try_recv().is_ok() {}

        assert!(
            rx.recv_timeout(Duration::from_millis(30)).is_err(),
            "no ticks may arrive after the guard is dropped"
        );
    }

    #[test]
    fn ticker_guard_explicit_cancel() {
        let (tx, rx) = mpsc::channel();
        let guard = TickerGuard::spawn(Duration::from_millis(5), tx);
        assert!(!guard.is_canceled());

        guard.cancel();
        assert!(guard.is_canceled());

        std::thread::sleep(Duration::from_millis(25));
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(30)).is_err());
    }
}
