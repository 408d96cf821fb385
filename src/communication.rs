use std::path::PathBuf;

use thiserror::Error;

/// sent from the ui thread to the audio thread
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackRequest {
    /// start one segment of the notification sound from the beginning
    Play,
    Stop,
    /// drop whatever is queued so the next play starts at the beginning
    SeekToStart,
    // sound or volume changed in the settings
    Configure { sound: Option<PathBuf>, volume: f32 },
}

/// sent from the audio thread back to the ui thread
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Started,
    SegmentEnded,
    Failed(PlaybackError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("the audio thread is not running")]
    Disconnected,
    #[error("couldn't open audio output: {0}")]
    Output(String),
    #[error("couldn't open sound file {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("couldn't decode sound file {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// the playback engine as seen by the alarm.
///
/// `play` only reports whether the request was accepted for delivery,
/// the real outcome comes later as a [`PlaybackEvent`].
pub trait Playback {
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn stop(&mut self);
    fn seek_to_start(&mut self);
}
