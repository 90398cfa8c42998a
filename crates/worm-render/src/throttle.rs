//! Leading-edge throttle with a trailing call
//!
//! The first call in an idle period fires at once. Calls inside the
//! interval are collapsed into one trailing call carrying the latest
//! argument, fired by [`Throttle::poll`] once the interval has passed.

#[derive(Debug)]
pub struct Throttle<T> {
    interval_ms: u64,
    last_fire: Option<u64>,
    trailing: Option<T>,
    fires: u64,
}

impl<T> Throttle<T> {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fire: None,
            trailing: None,
            fires: 0,
        }
    }

    fn ready(&self, now: u64) -> bool {
        self.last_fire
            .is_none_or(|last| now.saturating_sub(last) >= self.interval_ms)
    }

    /// Invoke; returns the argument when the call fires immediately
    pub fn call(&mut self, now: u64, arg: T) -> Option<T> {
        if self.ready(now) {
            self.trailing = None;
            self.fire(now);
            Some(arg)
        } else {
            self.trailing = Some(arg);
            None
        }
    }

    /// Fire the trailing call once its time has come
    pub fn poll(&mut self, now: u64) -> Option<T> {
        if self.trailing.is_some() && self.ready(now) {
            self.fire(now);
            return self.trailing.take();
        }
        None
    }

    fn fire(&mut self, now: u64) {
        self.last_fire = Some(now);
        self.fires += 1;
    }

    /// When the trailing call becomes due
    pub fn deadline(&self) -> Option<u64> {
        match (&self.trailing, self.last_fire) {
            (Some(_), Some(last)) => Some(last + self.interval_ms),
            _ => None,
        }
    }

    /// Drop the trailing call and forget the last fire time
    pub fn cancel(&mut self) {
        self.trailing = None;
        self.last_fire = None;
    }

    pub fn has_trailing(&self) -> bool {
        self.trailing.is_some()
    }

    /// Times the throttled action actually ran
    pub fn fires(&self) -> u64 {
        self.fires
    }
}
