//! Audio output seam
//!
//! The simulation only names the sounds it wants played. Playback belongs to
//! the host, which plugs in its own [`AudioPlayer`].

/// Fire-and-forget sound output
pub trait AudioPlayer {
    fn play(&self, sound: &str);
}

/// Discards every sound
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioPlayer for NullAudio {
    fn play(&self, _sound: &str) {}
}

/// Logs each sound instead of playing it, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAudio;

impl AudioPlayer for LoggingAudio {
    fn play(&self, sound: &str) {
        log::debug!("sound: {}", sound);
    }
}
