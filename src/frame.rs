//! The per-refresh frame loop.
//!
//! The host decides when frames happen. [`FrameDriver`] only asks for the next
//! one through a [`FrameScheduler`] after finishing the current one, so there is
//! never more than one frame outstanding. Stopping goes through a
//! [`CancellationToken`] that any part of the application can hold.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

/// Something that can be asked for one more frame.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

impl FrameScheduler for Arc<winit::window::Window> {
    fn request_frame(&mut self) {
        self.request_redraw();
    }
}

#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Monotonic clock measuring time since start and since the previous tick.
#[derive(Debug)]
pub struct Clock {
    start: instant::Instant,
    last: instant::Instant,
}

impl Clock {
    pub fn new() -> Self {
        let now = instant::Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = instant::Instant::now();
        let time = FrameTime {
            elapsed: now.duration_since(self.start),
            delta: now.duration_since(self.last),
        };
        self.last = now;
        time
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTime {
    pub elapsed: Duration,
    pub delta: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug)]
pub struct FrameDriver {
    state: DriverState,
    clock: Clock,
    token: CancellationToken,
    frames: u64,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::with_token(CancellationToken::new())
    }

    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            state: DriverState::Idle,
            clock: Clock::new(),
            token,
            frames: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Number of frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Begin the loop and ask for the first frame. Does nothing unless idle.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.state != DriverState::Idle {
            return;
        }
        if self.token.is_cancelled() {
            self.state = DriverState::Stopped;
            return;
        }
        self.state = DriverState::Running;
        self.clock = Clock::new();
        scheduler.request_frame();
        log::debug!("Frame loop started");
    }

    /// Run one frame if running, then schedule the next.
    ///
    /// Returns whether `frame` was called.
    pub fn tick<S, F>(&mut self, scheduler: &mut S, mut frame: F) -> bool
    where
        S: FrameScheduler + ?Sized,
        F: FnMut(FrameTime),
    {
        if self.state != DriverState::Running {
            return false;
        }
        if self.token.is_cancelled() {
            self.state = DriverState::Stopped;
            log::debug!("Frame loop stopped after {} frames", self.frames);
            return false;
        }
        frame(self.clock.tick());
        self.frames += 1;
        scheduler.request_frame();
        true
    }

    /// Stop at the next tick. Stopped is terminal.
    pub fn stop(&mut self) {
        self.token.cancel();
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}
