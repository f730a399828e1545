//! Cancellable one-shot timers and the transient banner.

use crate::surface::{ElementKey, ElementUpdate, Overlay, OverlaySurface};

/// One-shot countdown. Re-arming replaces the pending deadline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Timer {
    remaining: Option<f32>,
}

impl Timer {
    pub fn start(&mut self, seconds: f32) {
        self.remaining = Some(seconds.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Returns true on the tick the timer fires.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.remaining = None;
            true
        } else {
            false
        }
    }
}

/// A message shown for a fixed time. A new message replaces the old one and its timer.
#[derive(Clone, Debug, Default)]
pub struct Banner {
    message: Option<String>,
    timer: Timer,
    dirty: bool,
}

impl Banner {
    pub fn show(&mut self, message: impl Into<String>, seconds: f32) {
        self.message = Some(message.into());
        self.timer.start(seconds);
        self.dirty = true;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn tick(&mut self, dt: f32) {
        if self.timer.tick(dt) {
            self.message = None;
            self.dirty = true;
        }
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
        if self.message.take().is_some() {
            self.dirty = true;
        }
    }

    pub fn flush<S: OverlaySurface>(&mut self, overlay: &mut Overlay<S>) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        match &self.message {
            Some(text) => {
                overlay.text(ElementKey::Banner, text.clone());
                overlay.update(ElementKey::Banner, ElementUpdate::Visible(true));
            }
            None => overlay.update(ElementKey::Banner, ElementUpdate::Visible(false)),
        }
    }
}
