// Polls the font probe for one family until it loads or times out.
use bevy_ecs::prelude::Component;

#[derive(Component, Debug, Clone)]
pub struct FontWatch {
    pub family: String,
    /// Seconds since the watch started.
    pub elapsed: f32,
    /// Seconds since the last probe.
    pub since_check: f32,
    /// Seconds between probes.
    pub interval: f32,
    /// Give up after this many seconds; `None` waits forever.
    pub timeout: Option<f32>,
    pub attempts: u32,
}

impl FontWatch {
    pub fn new(family: impl Into<String>, interval: f32, timeout: Option<f32>) -> Self {
        FontWatch {
            family: family.into(),
            elapsed: 0.0,
            // Due on the first tick.
            since_check: interval,
            interval,
            timeout,
            attempts: 0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
        self.since_check += dt;
    }

    pub fn due(&self) -> bool {
        self.since_check >= self.interval
    }

    pub fn timed_out(&self) -> bool {
        self.timeout.is_some_and(|t| self.elapsed >= t)
    }

    pub fn reset_check(&mut self) {
        self.since_check = 0.0;
        self.attempts += 1;
    }
}
