use std::time::{Duration, Instant};

/// Time source for the geocoder's rate limiter.
///
/// Reading the time comes from `governor`'s clock so the limiter can run on it
/// directly; this adds the blocking wait.
pub trait Clock: governor::clock::Clock + Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl governor::clock::Clock for SystemClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use governor::clock::{Clock as _, FakeRelativeClock};
    use std::sync::{Arc, Mutex};

    /// Manually driven clock. `sleep` advances time instantly and is recorded.
    /// Clones share the same time.
    #[derive(Clone, Default)]
    pub struct FakeClock {
        time: FakeRelativeClock,
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    impl FakeClock {
        pub fn advance(&self, by: Duration) {
            self.time.advance(by);
        }

        /// Time since the clock was created.
        pub fn elapsed(&self) -> Duration {
            Duration::from(self.time.now())
        }

        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    impl governor::clock::Clock for FakeClock {
        type Instant = <FakeRelativeClock as governor::clock::Clock>::Instant;

        fn now(&self) -> Self::Instant {
            self.time.now()
        }
    }

    impl Clock for FakeClock {
        fn sleep(&self, duration: Duration) {
            self.time.advance(duration);
            self.sleeps.lock().unwrap().push(duration);
        }
    }
}
