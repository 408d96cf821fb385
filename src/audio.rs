//! the audio thread.
//!
//! rodio's output stream can't leave the thread it was opened on, so it lives on its own
//! thread which takes [`PlaybackRequest`]s and answers with [`PlaybackEvent`]s.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread,
    time::Duration,
};

use log::{debug, error, info};
use rodio::{source::SineWave, Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::communication::{Playback, PlaybackError, PlaybackEvent, PlaybackRequest};

/// how often the thread checks whether the current segment has finished
const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// the built in tone used when no sound file is configured
const TONE_FREQUENCY: f32 = 880.0;
const TONE_LENGTH: Duration = Duration::from_secs(2);

/// the ui side of the audio thread
#[derive(Debug)]
pub struct ChannelPlayback {
    sender: Sender<PlaybackRequest>,
}

impl ChannelPlayback {
    #[must_use]
    pub const fn new(sender: Sender<PlaybackRequest>) -> Self {
        Self { sender }
    }

    pub fn configure(&self, sound: Option<PathBuf>, volume: f32) {
        self.send(PlaybackRequest::Configure { sound, volume });
    }

    fn send(&self, request: PlaybackRequest) {
        if let Err(err) = self.sender.send(request) {
            debug!("audio thread is gone, dropping {:?}", err.0);
        }
    }
}

impl Playback for ChannelPlayback {
    fn play(&mut self) -> Result<(), PlaybackError> {
        self.sender
            .send(PlaybackRequest::Play)
            .map_err(|_| PlaybackError::Disconnected)
    }

    fn stop(&mut self) {
        self.send(PlaybackRequest::Stop);
    }

    fn seek_to_start(&mut self) {
        self.send(PlaybackRequest::SeekToStart);
    }
}

/// starts the audio thread, returns its request side and the events it reports
#[must_use]
pub fn spawn_audio_thread(
    sound: Option<PathBuf>,
    volume: f32,
) -> (ChannelPlayback, Receiver<PlaybackEvent>) {
    let (request_tx, request_rx) = mpsc::channel();
    let (event_tx, event_rx) = mpsc::channel();
    thread::spawn(move || {
        let output = OutputStream::try_default()
            .map_err(|err| PlaybackError::Output(err.to_string()))
            .inspect_err(|err| error!("{err}"));
        let mut player = Player {
            output,
            sound,
            volume,
            sink: None,
        };
        player.run(&request_rx, &event_tx);
        info!("audio thread stopped");
    });
    (ChannelPlayback::new(request_tx), event_rx)
}

struct Player {
    // the stream has to stay alive for the handle to work
    output: Result<(OutputStream, OutputStreamHandle), PlaybackError>,
    sound: Option<PathBuf>,
    volume: f32,
    sink: Option<Sink>,
}

impl Player {
    fn run(&mut self, requests: &Receiver<PlaybackRequest>, events: &Sender<PlaybackEvent>) {
        loop {
            if self.sink.as_ref().is_some_and(Sink::empty) {
                self.sink = None;
                if events.send(PlaybackEvent::SegmentEnded).is_err() {
                    break;
                }
            }
            let event = match requests.recv_timeout(POLL_INTERVAL) {
                Ok(PlaybackRequest::Play) => Some(match self.play() {
                    Ok(()) => PlaybackEvent::Started,
                    Err(err) => PlaybackEvent::Failed(err),
                }),
                Ok(PlaybackRequest::Stop | PlaybackRequest::SeekToStart) => {
                    // every segment is decoded from the start, so seeking is just dropping the old one
                    if let Some(sink) = self.sink.take() {
                        sink.stop();
                    }
                    None
                }
                Ok(PlaybackRequest::Configure { sound, volume }) => {
                    debug!("alarm sound is now {sound:?} at {volume}%");
                    self.sound = sound;
                    self.volume = volume;
                    if let Some(sink) = &self.sink {
                        sink.set_volume(volume / 100.0);
                    }
                    None
                }
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => None,
            };
            if let Some(event) = event {
                if events.send(event).is_err() {
                    break;
                }
            }
        }
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let (_, handle) = self.output.as_ref().map_err(Clone::clone)?;
        let sink = Sink::try_new(handle).map_err(|err| PlaybackError::Output(err.to_string()))?;
        sink.set_volume(self.volume / 100.0);
        match &self.sound {
            Some(path) => sink.append(open_sound(path)?),
            None => sink.append(
                SineWave::new(TONE_FREQUENCY)
                    .take_duration(TONE_LENGTH)
                    .amplify(0.25),
            ),
        }
        sink.play();
        self.sink = Some(sink);
        Ok(())
    }
}

fn open_sound(path: &Path) -> Result<Decoder<BufReader<File>>, PlaybackError> {
    let file = File::open(path).map_err(|err| PlaybackError::Open {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    Decoder::new(BufReader::new(file)).map_err(|err| PlaybackError::Decode {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_reach_the_audio_side() {
        let (tx, rx) = mpsc::channel();
        let mut playback = ChannelPlayback::new(tx);
        playback.stop();
        playback.seek_to_start();
        playback.play().unwrap();
        playback.configure(None, 50.0);
        let sent: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            sent,
            vec![
                PlaybackRequest::Stop,
                PlaybackRequest::SeekToStart,
                PlaybackRequest::Play,
                PlaybackRequest::Configure {
                    sound: None,
                    volume: 50.0
                },
            ]
        );
    }

    #[test]
    fn play_fails_once_the_audio_thread_is_gone() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut playback = ChannelPlayback::new(tx);
        assert_eq!(playback.play(), Err(PlaybackError::Disconnected));
        // stop and seek are fire and forget
        playback.stop();
        playback.seek_to_start();
    }

    #[test]
    fn missing_sound_file_reports_open_error() {
        let path = Path::new("/definitely/not/here.mp3");
        assert!(matches!(
            open_sound(path),
            Err(PlaybackError::Open { path: p, .. }) if p == path
        ));
    }
}
