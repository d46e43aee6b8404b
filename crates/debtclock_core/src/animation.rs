//! Frame-driven value animation
//!
//! The [`Animator`] owns at most one session. The host calls
//! [`Animator::tick`] once per display frame; each tick samples the clock,
//! eases the elapsed fraction and reports the interpolated value to the
//! session's callback. The final tick always reports the exact target.
//!
//! Starting a new session cancels the running one before its next frame, so
//! only one writer ever updates the display surface.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::AnimationConfig;
use crate::easing::Easing;

/// Source of high-resolution timestamps in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Deterministic clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Parameters for one animation session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRequest {
    pub start_value: f64,
    pub target_value: f64,
    pub duration_ms: f64,
    pub easing: Easing,
    /// When false the target is reported once, immediately
    pub enabled: bool,
}

impl AnimationRequest {
    /// Count up to `target` from the configured reduction below it.
    pub fn from_config(config: &AnimationConfig, target: f64) -> Self {
        Self {
            start_value: config.start_value(target),
            target_value: target,
            duration_ms: config.duration_ms as f64,
            easing: config.easing(),
            enabled: config.enabled,
        }
    }

    /// Value shown at a given progress
    pub fn value_at(&self, progress: f64) -> f64 {
        if progress >= 1.0 {
            return self.target_value;
        }
        let eased = self.easing.apply(progress);
        self.start_value + (self.target_value - self.start_value) * eased
    }
}

/// Cooperative cancellation token for one session.
///
/// Cancelling turns every later tick of that session into a no-op.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Rc<Cell<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

struct Session {
    request: AnimationRequest,
    started_at: f64,
    handle: CancelHandle,
    on_tick: Box<dyn FnMut(f64)>,
}

/// Drives one display target's animation.
pub struct Animator<C: Clock> {
    clock: C,
    session: Option<Session>,
}

impl<C: Clock> Animator<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            session: None,
        }
    }

    /// Start a new session, cancelling any session already running.
    ///
    /// With animation disabled or a non-positive duration, `on_tick` receives
    /// the target exactly once before this returns.
    pub fn animate<F>(&mut self, request: AnimationRequest, mut on_tick: F) -> CancelHandle
    where
        F: FnMut(f64) + 'static,
    {
        self.cancel();

        if !request.enabled || request.duration_ms.is_nan() || request.duration_ms <= 0.0 {
            on_tick(request.target_value);
            return CancelHandle::default();
        }

        let handle = CancelHandle::default();
        self.session = Some(Session {
            request,
            started_at: self.clock.now_ms(),
            handle: handle.clone(),
            on_tick: Box::new(on_tick),
        });
        handle
    }

    /// Advance the running session by one frame.
    ///
    /// Returns true while more frames are needed.
    pub fn tick(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        if session.handle.is_cancelled() {
            self.session = None;
            return false;
        }

        let elapsed = self.clock.now_ms() - session.started_at;
        let progress = (elapsed / session.request.duration_ms).clamp(0.0, 1.0);
        let value = session.request.value_at(progress);
        (session.on_tick)(value);

        if progress < 1.0 {
            true
        } else {
            self.session = None;
            false
        }
    }

    /// Cancel the running session, if any.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            session.handle.cancel();
        }
    }

    pub fn is_animating(&self) -> bool {
        self.session.is_some()
    }
}
