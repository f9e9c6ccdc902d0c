use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of mutation timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock with microsecond resolution that never repeats or goes back.
///
/// If the wall clock has not advanced past the previous reading, the next
/// reading is the previous one plus one microsecond. Creation order is
/// therefore always reflected in `created_at`.
pub struct SystemClock {
    last: Mutex<DateTime<Utc>>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    fn wall_clock() -> DateTime<Utc> {
        let now = Utc::now();
        DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let wall = Self::wall_clock();
        let mut last = self.last.lock().expect("clock mutex poisoned");
        let next = if wall > *last {
            wall
        } else {
            *last + Duration::microseconds(1)
        };
        *last = next;
        next
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().expect("clock mutex poisoned");
        *current += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.current.lock().expect("clock mutex poisoned") = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().expect("clock mutex poisoned")
    }
}
