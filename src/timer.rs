use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    sync::{
        Arc,
        Mutex,
    },
    time::{
        Duration,
        Instant,
    },
};

/// Stopwatch reading. Field order gives the minutes-then-seconds ordering.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "RawElapsedTime")]
pub struct ElapsedTime {
    pub minutes: u64,
    pub seconds: u8,
}

#[derive(Deserialize)]
struct RawElapsedTime {
    minutes: u64,
    seconds: u8,
}

impl TryFrom<RawElapsedTime> for ElapsedTime {
    type Error = String;

    fn try_from(raw: RawElapsedTime) -> Result<Self, Self::Error> {
        if raw.seconds > 59 {
            return Err(format!("seconds out of range: {}", raw.seconds));
        }
        Ok(Self::new(raw.minutes, raw.seconds))
    }
}

impl ElapsedTime {
    pub fn new(minutes: u64, seconds: u8) -> Self {
        Self { minutes, seconds }
    }

    pub fn from_duration(duration: Duration) -> Self {
        let total = duration.as_secs();
        Self {
            minutes: total / 60,
            seconds: (total % 60) as u8,
        }
    }
}

/// Renders as `M:SS`.
impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same reading.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[derive(Debug)]
pub struct Stopwatch<C> {
    clock: C,
    banked: Duration,
    running_since: Option<Instant>,
}

impl<C: Clock> Stopwatch<C> {
    /// Creates a stopwatch that is already counting.
    pub fn start_new(clock: C) -> Self {
        let running_since = Some(clock.now());
        Self {
            clock,
            banked: Duration::ZERO,
            running_since,
        }
    }

    pub fn elapsed_duration(&self) -> Duration {
        match self.running_since {
            Some(since) => self.banked + self.clock.now().saturating_duration_since(since),
            None => self.banked,
        }
    }

    pub fn elapsed(&self) -> ElapsedTime {
        ElapsedTime::from_duration(self.elapsed_duration())
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Stops counting. Pausing a paused stopwatch does nothing.
    pub fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked += self.clock.now().saturating_duration_since(since);
        }
    }

    pub fn resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(self.clock.now());
        }
    }

    /// Zeroes the reading and starts counting again.
    pub fn reset(&mut self) {
        self.banked = Duration::ZERO;
        self.running_since = Some(self.clock.now());
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn elapsed_time__rejects_seconds_past_59_when_read() {
        let ok: ElapsedTime = serde_json::from_str(r#"{"minutes":2,"seconds":59}"#).unwrap();
        assert_eq!(ok, ElapsedTime::new(2, 59));

        let bad = serde_json::from_str::<ElapsedTime>(r#"{"minutes":0,"seconds":60}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn elapsed_time__orders_by_minutes_then_seconds() {
        assert!(ElapsedTime::new(0, 59) < ElapsedTime::new(1, 0));
        assert!(ElapsedTime::new(1, 5) < ElapsedTime::new(1, 6));
        assert!(ElapsedTime::new(2, 0) > ElapsedTime::new(1, 59));
        assert_eq!(ElapsedTime::new(3, 3), ElapsedTime::new(3, 3));
    }

    #[test]
    fn elapsed_time__displays_zero_padded_seconds() {
        assert_eq!(ElapsedTime::new(0, 0).to_string(), "0:00");
        assert_eq!(ElapsedTime::new(1, 7).to_string(), "1:07");
        assert_eq!(ElapsedTime::new(12, 45).to_string(), "12:45");
    }

    #[test]
    fn from_duration__splits_minutes_and_seconds() {
        let t = ElapsedTime::from_duration(Duration::from_millis(125_900));
        assert_eq!(t, ElapsedTime::new(2, 5));
    }

    #[test]
    fn stopwatch__counts_from_creation() {
        // given
        let clock = ManualClock::new();
        let watch = Stopwatch::start_new(clock.clone());

        // when
        clock.advance(Duration::from_secs(75));

        // then
        assert!(watch.is_running());
        assert_eq!(watch.elapsed(), ElapsedTime::new(1, 15));
    }

    #[test]
    fn pause__freezes_reading_and_is_idempotent() {
        // given
        let clock = ManualClock::new();
        let mut watch = Stopwatch::start_new(clock.clone());
        clock.advance(Duration::from_secs(10));

        // when
        watch.pause();
        clock.advance(Duration::from_secs(30));
        watch.pause();

        // then
        assert!(!watch.is_running());
        assert_eq!(watch.elapsed(), ElapsedTime::new(0, 10));
    }

    #[test]
    fn resume__continues_from_banked_time() {
        // given
        let clock = ManualClock::new();
        let mut watch = Stopwatch::start_new(clock.clone());
        clock.advance(Duration::from_secs(10));
        watch.pause();
        clock.advance(Duration::from_secs(100));

        // when
        watch.resume();
        clock.advance(Duration::from_secs(5));

        // then
        assert_eq!(watch.elapsed(), ElapsedTime::new(0, 15));
    }

    #[test]
    fn reset__zeroes_and_restarts_a_paused_watch() {
        // given
        let clock = ManualClock::new();
        let mut watch = Stopwatch::start_new(clock.clone());
        clock.advance(Duration::from_secs(42));
        watch.pause();

        // when
        watch.reset();

        // then
        assert!(watch.is_running());
        assert_eq!(watch.elapsed(), ElapsedTime::new(0, 0));
        clock.advance(Duration::from_secs(3));
        assert_eq!(watch.elapsed(), ElapsedTime::new(0, 3));
    }
}
