use instant::Instant;

/// Source of frame timing for the bridge loop.
pub trait FrameClock {
    /// Milliseconds since the previous call (0 on the first call).
    fn delta_ms(&mut self) -> f64;

    /// Milliseconds since the clock was created.
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by `instant`, valid on native and wasm32.
pub struct InstantClock {
    start: Instant,
    last: Option<Instant>,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last: None,
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for InstantClock {
    fn delta_ms(&mut self) -> f64 {
        let now = Instant::now();
        let dt = self
            .last
            .map(|prev| (now - prev).as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        self.last = Some(now);
        dt
    }

    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Deterministic clock that advances by a fixed step per frame.
#[derive(Clone, Debug)]
pub struct ManualClock {
    step_ms: f64,
    now_ms: f64,
}

impl ManualClock {
    pub fn new(step_ms: f64) -> Self {
        Self { step_ms, now_ms: 0.0 }
    }

    pub fn set_step(&mut self, step_ms: f64) {
        self.step_ms = step_ms;
    }
}

impl FrameClock for ManualClock {
    fn delta_ms(&mut self) -> f64 {
        self.now_ms += self.step_ms;
        self.step_ms
    }

    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}
