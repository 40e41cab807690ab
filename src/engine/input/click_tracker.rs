use crate::engine::event::MouseButton;
use web_time::Duration;

pub const DEFAULT_DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
pub const DEFAULT_CLICK_TOLERANCE: i32 = 3;
pub const MAX_SUCCESSIVE_CLICKS: u32 = 3;

#[derive(Debug, Copy, Clone)]
struct LastClick {
    button: MouseButton,
    x: i32,
    y: i32,
    time: Duration,
}

/// Counts successive presses of the same button that land close together
/// in space and time. The count runs 1, 2, 3 and starts over after 3.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    double_click_time: Duration,
    tolerance: i32,
    last: Option<LastClick>,
    count: u32,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_CLICK_TIME, DEFAULT_CLICK_TOLERANCE)
    }
}

impl ClickTracker {
    pub fn new(double_click_time: Duration, tolerance: i32) -> Self {
        ClickTracker {
            double_click_time,
            tolerance: tolerance.max(0),
            last: None,
            count: 0,
        }
    }

    pub fn double_click_time(&self) -> Duration {
        self.double_click_time
    }

    pub fn set_double_click_time(&mut self, time: Duration) {
        self.double_click_time = time;
    }

    /// Registers a press and returns its position in the current run.
    pub fn press(&mut self, button: MouseButton, x: i32, y: i32, time: Duration) -> u32 {
        let continues = self.last.is_some_and(|last| {
            last.button == button
                && time.saturating_sub(last.time) < self.double_click_time
                && (last.x - x).abs() <= self.tolerance
                && (last.y - y).abs() <= self.tolerance
                && self.count < MAX_SUCCESSIVE_CLICKS
        });

        self.count = if continues { self.count + 1 } else { 1 };
        self.last = Some(LastClick { button, x, y, time });
        self.count
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.count = 0;
    }
}
