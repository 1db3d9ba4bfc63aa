use std::time::{Duration, Instant};

/// Single-round stopwatch over the monotonic clock.
///
/// The runtime ticker drives `sample()` while a round runs; `stop()` freezes
/// the last observed elapsed time, which the caller hands to the state
/// machine. Once stopped (or canceled) further samples are inert, so a stale
/// tick can never move a measurement after the round has logically ended.
#[derive(Debug, Default)]
pub struct RoundTimer {
    started_at: Option<Instant>,
    last_elapsed: Duration,
}

impl RoundTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
        self.last_elapsed = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Re-read the clock. No-op unless running.
    pub fn sample(&mut self) -> Duration {
        if let Some(started_at) = self.started_at {
            self.last_elapsed = started_at.elapsed();
        }
        self.last_elapsed
    }

    /// Stop and return the final observed elapsed time.
    pub fn stop(&mut self) -> Duration {
        self.sample();
        self.started_at = None;
        self.last_elapsed
    }

    /// Abandon the round without keeping a measurement.
    pub fn cancel(&mut self) {
        self.started_at = None;
        self.last_elapsed = Duration::ZERO;
    }

    /// Last observed elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.last_elapsed.as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn starts_stopped() {
        let timer = RoundTimer::new();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_ms(), 0.0);
    }

    #[test]
    fn measures_elapsed_time() {
        let mut timer = RoundTimer::new();
        timer.start();
        thread::sleep(Duration::from_millis(20));
        let measured = timer.stop();

        assert!(!timer.is_running());
        assert!(measured >= Duration::from_millis(20));
        assert_eq!(timer.elapsed_ms(), measured.as_secs_f64() * 1000.0);
    }

    #[test]
    fn sample_is_inert_after_stop() {
        let mut timer = RoundTimer::new();
        timer.start();
        thread::sleep(Duration::from_millis(10));
        let measured = timer.stop();

        // a stale tick arriving after the round ended
        thread::sleep(Duration::from_millis(10));
        assert_eq!(timer.sample(), measured);
        assert_eq!(timer.elapsed_ms(), measured.as_secs_f64() * 1000.0);
    }

    #[test]
    fn sample_advances_while_running() {
        let mut timer = RoundTimer::new();
        timer.start();
        let first = timer.sample();
        thread::sleep(Duration::from_millis(10));
        let second = timer.sample();
        assert!(second > first);
    }

    #[test]
    fn cancel_discards_the_measurement() {
        let mut timer = RoundTimer::new();
        timer.start();
        thread::sleep(Duration::from_millis(5));
        timer.cancel();

        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_ms(), 0.0);
        assert_eq!(timer.sample(), Duration::ZERO);
    }

    #[test]
    fn restart_resets_previous_round() {
        let mut timer = RoundTimer::new();
        timer.start();
        thread::sleep(Duration::from_millis(10));
        timer.stop();

        timer.start();
        let fresh = timer.sample();
        assert!(fresh < Duration::from_millis(10));
        assert!(timer.is_running());
    }
}
