//! Animation frame scheduling
//!
//! At most one frame request is in flight. Requesting a new frame cancels
//! the pending one.

/// Handle for one frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever is pending and request a new frame
    pub fn request(&mut self) -> FrameHandle {
        self.cancel();
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    /// Cancel the pending request; returns whether there was one
    pub fn cancel(&mut self) -> bool {
        let had = self.pending.take().is_some();
        if had {
            self.cancelled += 1;
        }
        had
    }

    /// Fire the pending frame, if any
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Requests made so far
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Requests cancelled before firing
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}
