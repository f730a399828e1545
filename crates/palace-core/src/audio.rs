//! Background track toggle. Playback failures never escape this module.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// Playback refused, e.g. by an autoplay policy.
    Rejected(String),
    Unavailable,
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Rejected(reason) => write!(f, "playback rejected: {reason}"),
            AudioError::Unavailable => write!(f, "no audio output"),
        }
    }
}

impl std::error::Error for AudioError {}

/// A loopable track player.
pub trait AudioBackend {
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
}

/// Accepts every request and plays nothing.
#[derive(Debug, Default, Clone)]
pub struct SilentAudio {
    pub playing: bool,
}

impl AudioBackend for SilentAudio {
    fn play(&mut self) -> Result<(), AudioError> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AudioToggle {
    on: bool,
}

impl AudioToggle {
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Flip the toggle. A refused play is logged and leaves it off.
    pub fn toggle(&mut self, backend: &mut dyn AudioBackend) -> bool {
        if self.on {
            backend.pause();
            self.on = false;
        } else {
            match backend.play() {
                Ok(()) => self.on = true,
                Err(e) => {
                    tracing::warn!(error = %e, "audio playback failed");
                    self.on = false;
                }
            }
        }
        self.on
    }

    pub fn stop(&mut self, backend: &mut dyn AudioBackend) {
        if self.on {
            backend.pause();
            self.on = false;
        }
    }
}
