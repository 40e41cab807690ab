use web_time::{Duration, Instant};

/// Virtual device clock. Stopping it freezes [`Timer::time`] while real
/// time keeps going.
#[derive(Debug, Clone)]
pub struct Timer {
    origin: Instant,
    paused_total: Duration,
    stopped_at: Option<Instant>,
    stop_depth: u32,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Timer {
            origin: Instant::now(),
            paused_total: Duration::ZERO,
            stopped_at: None,
            stop_depth: 0,
        }
    }

    pub fn real_time(&self) -> Duration {
        self.origin.elapsed()
    }

    pub fn time(&self) -> Duration {
        let now = self.stopped_at.unwrap_or_else(Instant::now);
        now.saturating_duration_since(self.origin)
            .saturating_sub(self.paused_total)
    }

    /// Stops are counted; the clock runs again once every stop has been
    /// matched by a start.
    pub fn stop(&mut self) {
        if self.stop_depth == 0 {
            self.stopped_at = Some(Instant::now());
        }
        self.stop_depth += 1;
    }

    pub fn start(&mut self) {
        match self.stop_depth {
            0 => {}
            1 => {
                self.stop_depth = 0;
                if let Some(stopped) = self.stopped_at.take() {
                    self.paused_total += stopped.elapsed();
                }
            }
            _ => self.stop_depth -= 1,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_depth > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_timer_does_not_advance() {
        let mut timer = Timer::new();
        timer.stop();
        let frozen = timer.time();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(timer.time(), frozen);
        timer.start();
        assert!(!timer.is_stopped());
        assert!(timer.real_time() >= Duration::from_millis(5));
    }
}
