//! the countdown alarm.
//!
//! an alarm is armed with a duration, fires once the clock passes its target
//! time and then plays the notification sound exactly twice, one segment
//! after the other.

use chrono::{DateTime, Duration, Local};
use log::{debug, info, warn};
use thiserror::Error;

use crate::communication::{Playback, PlaybackError};

/// longest countdown that can be armed (2 hours)
pub const MAX_DURATION_SECS: i64 = 2 * 60 * 60;

/// how many segments a single firing plays
pub const SEGMENTS_PER_FIRING: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AlarmError {
    #[error("please select a duration between 1 second and 2 hours (got {seconds} seconds)")]
    InvalidDuration { seconds: i64 },
}

/// something the user has to be told about
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Notice {
    #[error("{0}")]
    Invalid(#[from] AlarmError),
    #[error("Alarm! (audio could not be played: {0})")]
    PlaybackFailed(#[from] PlaybackError),
}

/// checks that a countdown of `seconds` can be armed
///
/// # Errors
/// when `seconds` is not in `1..=MAX_DURATION_SECS`
pub fn validate_duration(seconds: i64) -> Result<Duration, AlarmError> {
    if (1..=MAX_DURATION_SECS).contains(&seconds) {
        Ok(Duration::seconds(seconds))
    } else {
        Err(AlarmError::InvalidDuration { seconds })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmPhase {
    Idle,
    Armed,
    /// a segment was requested or is playing
    Firing,
    /// fired and finished (or failed to play), the old target is kept until the next start/reset
    Done,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmState {
    armed: bool,
    target_time: Option<DateTime<Local>>,
    play_count: u8,
    pending_play_request: bool,
    // requested segment whose end (or failure) hasn't been reported yet
    segment_live: bool,
}

impl AlarmState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            armed: false,
            target_time: None,
            play_count: 0,
            pending_play_request: false,
            segment_live: false,
        }
    }

    #[must_use]
    pub const fn armed(&self) -> bool {
        self.armed
    }

    #[must_use]
    pub const fn target_time(&self) -> Option<DateTime<Local>> {
        self.target_time
    }

    #[must_use]
    pub const fn play_count(&self) -> u8 {
        self.play_count
    }

    #[must_use]
    pub const fn pending_play_request(&self) -> bool {
        self.pending_play_request
    }

    #[must_use]
    pub const fn phase(&self) -> AlarmPhase {
        if self.armed {
            AlarmPhase::Armed
        } else if self.segment_live {
            AlarmPhase::Firing
        } else if self.target_time.is_none() {
            AlarmPhase::Idle
        } else {
            AlarmPhase::Done
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Waiting,
    Fired,
    /// fired, but an earlier play request is still unanswered so nothing new was sent
    AlreadyPending,
    /// fired, but the playback engine refused the first segment
    Failed(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOutcome {
    /// no segment was live (stale event after a reset or a failure)
    Ignored,
    /// first segment done, second one requested
    Replaying,
    /// first segment done, but a play request is still unanswered so nothing new was sent
    AlreadyPending,
    Done,
    Failed(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayRequest {
    Sent,
    AlreadyPending,
}

/// owns the [`AlarmState`] and the playback engine, all state changes go through here
#[derive(Debug)]
pub struct AlarmController<P> {
    state: AlarmState,
    playback: P,
}

impl<P: Playback> AlarmController<P> {
    #[must_use]
    pub const fn new(playback: P) -> Self {
        Self {
            state: AlarmState::new(),
            playback,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AlarmState {
        &self.state
    }

    #[must_use]
    pub const fn playback(&self) -> &P {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut P {
        &mut self.playback
    }

    /// arms the alarm to fire `duration_seconds` after `now`.
    ///
    /// a firing from a previous countdown is silenced first, so only one cycle is ever live.
    ///
    /// # Errors
    /// when the duration is out of range, in which case nothing changes
    pub fn start(&mut self, duration_seconds: i64, now: DateTime<Local>) -> Result<(), AlarmError> {
        let duration = validate_duration(duration_seconds)?;
        if self.state.segment_live {
            debug!("silencing the previous alarm before arming a new one");
            self.halt_playback();
        }
        let target = now + duration;
        self.state = AlarmState {
            armed: true,
            target_time: Some(target),
            ..AlarmState::new()
        };
        info!("alarm armed for {duration_seconds}s, fires at {target}");
        Ok(())
    }

    pub fn tick(&mut self, now: DateTime<Local>) -> TickOutcome {
        match self.state.target_time {
            Some(target) if self.state.armed && now >= target => {}
            _ => return TickOutcome::Waiting,
        }
        self.state.armed = false;
        info!("alarm fired");
        match self.request_segment() {
            Ok(PlayRequest::Sent) => TickOutcome::Fired,
            Ok(PlayRequest::AlreadyPending) => TickOutcome::AlreadyPending,
            Err(notice) => TickOutcome::Failed(notice),
        }
    }

    /// disarms, forgets the target and silences any playback, from any phase
    pub fn reset(&mut self) {
        self.halt_playback();
        if self.state.phase() != AlarmPhase::Idle {
            info!("alarm reset from {:?}", self.state.phase());
        }
        self.state = AlarmState::new();
    }

    pub fn on_playback_started(&mut self) {
        self.state.pending_play_request = false;
    }

    pub fn on_playback_segment_ended(&mut self) -> SegmentOutcome {
        if !self.state.segment_live {
            debug!("ignoring the end of a segment that isn't live");
            return SegmentOutcome::Ignored;
        }
        // the segment obviously got accepted if it ended
        self.state.pending_play_request = false;
        self.state.play_count += 1;
        info!(
            "alarm segment {} of {SEGMENTS_PER_FIRING} finished",
            self.state.play_count
        );
        if self.state.play_count < SEGMENTS_PER_FIRING {
            match self.request_segment() {
                Ok(PlayRequest::Sent) => SegmentOutcome::Replaying,
                Ok(PlayRequest::AlreadyPending) => SegmentOutcome::AlreadyPending,
                Err(notice) => SegmentOutcome::Failed(notice),
            }
        } else {
            self.state.segment_live = false;
            SegmentOutcome::Done
        }
    }

    /// the firing cycle is over once playback fails, there is no retry
    pub fn on_playback_failed(&mut self, error: PlaybackError) -> Option<Notice> {
        if !self.state.segment_live {
            debug!("ignoring playback failure for a segment that isn't live: {error}");
            return None;
        }
        warn!("alarm sound couldn't be played: {error}");
        self.state.pending_play_request = false;
        self.state.segment_live = false;
        Some(Notice::PlaybackFailed(error))
    }

    fn request_segment(&mut self) -> Result<PlayRequest, Notice> {
        if self.state.pending_play_request {
            debug!("a play request is already pending");
            return Ok(PlayRequest::AlreadyPending);
        }
        self.playback.stop();
        self.playback.seek_to_start();
        self.state.pending_play_request = true;
        self.state.segment_live = true;
        if let Err(error) = self.playback.play() {
            // on_playback_failed always yields a notice while the segment is live
            return Err(self
                .on_playback_failed(error.clone())
                .unwrap_or(Notice::PlaybackFailed(error)));
        }
        Ok(PlayRequest::Sent)
    }

    fn halt_playback(&mut self) {
        self.playback.stop();
        self.playback.seek_to_start();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Play,
        Stop,
        SeekToStart,
    }

    #[derive(Debug, Default)]
    struct FakePlayback {
        calls: Vec<Call>,
        refuse: bool,
    }

    impl FakePlayback {
        fn plays(&self) -> usize {
            self.calls.iter().filter(|c| **c == Call::Play).count()
        }
    }

    impl Playback for FakePlayback {
        fn play(&mut self) -> Result<(), PlaybackError> {
            self.calls.push(Call::Play);
            if self.refuse {
                Err(PlaybackError::Disconnected)
            } else {
                Ok(())
            }
        }

        fn stop(&mut self) {
            self.calls.push(Call::Stop);
        }

        fn seek_to_start(&mut self) {
            self.calls.push(Call::SeekToStart);
        }
    }

    fn controller() -> AlarmController<FakePlayback> {
        AlarmController::new(FakePlayback::default())
    }

    #[test]
    fn start_arms_for_every_valid_duration() {
        let now = Local::now();
        for d in [1, 2, 59, 60, 3599, 3600, 7199, MAX_DURATION_SECS] {
            let mut alarm = controller();
            alarm.start(d, now).unwrap();
            assert!(alarm.state().armed());
            assert_eq!(alarm.state().target_time(), Some(now + Duration::seconds(d)));
            assert_eq!(alarm.state().phase(), AlarmPhase::Armed);
        }
    }

    #[test]
    fn start_rejects_out_of_range_durations() {
        let now = Local::now();
        for d in [i64::MIN, -1, 0, MAX_DURATION_SECS + 1, i64::MAX] {
            let mut alarm = controller();
            assert_eq!(
                alarm.start(d, now),
                Err(AlarmError::InvalidDuration { seconds: d })
            );
            assert_eq!(alarm.state(), &AlarmState::new());
            assert!(alarm.playback().calls.is_empty());
        }
    }

    #[test]
    fn rejected_start_keeps_a_running_countdown() {
        let now = Local::now();
        let mut alarm = controller();
        alarm.start(30, now).unwrap();
        let before = alarm.state().clone();
        assert!(alarm.start(0, now).is_err());
        assert_eq!(alarm.state(), &before);
    }

    #[test]
    fn tick_before_target_never_disarms() {
        let now = Local::now();
        let mut alarm = controller();
        alarm.start(10, now).unwrap();
        for ms in [0, 1, 5_000, 9_999] {
            assert_eq!(
                alarm.tick(now + Duration::milliseconds(ms)),
                TickOutcome::Waiting
            );
            assert!(alarm.state().armed());
        }
        assert_eq!(alarm.playback().plays(), 0);
    }

    #[test]
    fn tick_fires_exactly_once() {
        let now = Local::now();
        let mut alarm = controller();
        alarm.start(10, now).unwrap();
        let target = now + Duration::seconds(10);
        assert_eq!(alarm.tick(target), TickOutcome::Fired);
        assert!(!alarm.state().armed());
        assert!(alarm.state().pending_play_request());
        assert_eq!(alarm.state().phase(), AlarmPhase::Firing);
        assert_eq!(
            alarm.playback().calls,
            vec![Call::Stop, Call::SeekToStart, Call::Play]
        );
        assert_eq!(alarm.tick(target), TickOutcome::Waiting);
        assert_eq!(
            alarm.tick(target + Duration::seconds(3)),
            TickOutcome::Waiting
        );
        assert_eq!(alarm.playback().plays(), 1);
    }

    #[test]
    fn late_tick_still_fires() {
        let now = Local::now();
        let mut alarm = controller();
        alarm.start(1, now).unwrap();
        assert_eq!(alarm.tick(now + Duration::minutes(5)), TickOutcome::Fired);
    }

    #[test]
    fn plays_twice_then_stops() {
        let now = Local::now();
        let mut alarm = controller();
        alarm.start(1, now).unwrap();
        alarm.tick(now + Duration::seconds(1));
        alarm.on_playback_started();
        assert!(!alarm.state().pending_play_request());

        assert_eq!(alarm.on_playback_segment_ended(), SegmentOutcome::Replaying);
        assert_eq!(alarm.state().play_count(), 1);
        assert_eq!(alarm.playback().plays(), 2);

        assert_eq!(alarm.on_playback_segment_ended(), SegmentOutcome::Done);
        assert_eq!(alarm.state().play_count(), 2);
        assert_eq!(alarm.playback().plays(), 2);
        assert_eq!(alarm.state().phase(), AlarmPhase::Done);

        assert_eq!(alarm.on_playback_segment_ended(), SegmentOutcome::Ignored);
        assert_eq!(alarm.state().play_count(), 2);
    }

    #[test]
    fn unanswered_play_request_is_not_reported_as_sent() {
        let now = Local::now();
        let mut alarm = controller();
        alarm.start(1, now).unwrap();
        alarm.state.pending_play_request = true;
        assert_eq!(
            alarm.tick(now + Duration::seconds(1)),
            TickOutcome::AlreadyPending
        );
        assert!(!alarm.state().armed());
        assert!(alarm.playback().calls.is_empty());
    }

    #[test]
    fn segment_end_without_firing_is_ignored() {
        let mut alarm = controller();
        assert_eq!(alarm.on_playback_segment_ended(), SegmentOutcome::Ignored);
        assert_eq!(alarm.state().play_count(), 0);
        assert!(alarm.playback().calls.is_empty());
    }

    #[test]
    fn failed_playback_is_terminal() {
        let now = Local::now();
        let mut alarm = controller();
        alarm.start(1, now).unwrap();
        alarm.tick(now + Duration::seconds(1));
        let notice = alarm.on_playback_failed(PlaybackError::Output("no device".into()));
        assert!(matches!(notice, Some(Notice::PlaybackFailed(_))));
        assert_eq!(alarm.state().play_count(), 0);
        assert!(!alarm.state().pending_play_request());
        assert_eq!(alarm.state().phase(), AlarmPhase::Done);
        // no retry, and a late end event does nothing
        assert_eq!(alarm.on_playback_segment_ended(), SegmentOutcome::Ignored);
        assert_eq!(alarm.playback().plays(), 1);
    }

    #[test]
    fn refused_play_request_surfaces_a_notice() {
        let now = Local::now();
        let mut alarm = AlarmController::new(FakePlayback {
            refuse: true,
            ..FakePlayback::default()
        });
        alarm.start(1, now).unwrap();
        assert_eq!(
            alarm.tick(now + Duration::seconds(1)),
            TickOutcome::Failed(Notice::PlaybackFailed(PlaybackError::Disconnected))
        );
        assert_eq!(alarm.state().phase(), AlarmPhase::Done);
        assert_eq!(alarm.playback().plays(), 1);
    }

    #[test]
    fn reset_from_every_phase() {
        let now = Local::now();
        let setups: [fn(&mut AlarmController<FakePlayback>, DateTime<Local>); 4] = [
            |_, _| {},
            |a, now| a.start(5, now).unwrap(),
            |a, now| {
                a.start(5, now).unwrap();
                a.tick(now + Duration::seconds(5));
            },
            |a, now| {
                a.start(5, now).unwrap();
                a.tick(now + Duration::seconds(5));
                a.on_playback_segment_ended();
                a.on_playback_segment_ended();
            },
        ];
        for setup in setups {
            let mut alarm = controller();
            setup(&mut alarm, now);
            alarm.playback_mut().calls.clear();
            alarm.reset();
            assert_eq!(alarm.state(), &AlarmState::new());
            assert_eq!(alarm.state().phase(), AlarmPhase::Idle);
            assert_eq!(alarm.playback().calls, vec![Call::Stop, Call::SeekToStart]);
        }
    }

    #[test]
    fn reset_is_idempotent() {
        let mut alarm = controller();
        alarm.reset();
        alarm.reset();
        assert_eq!(alarm.state(), &AlarmState::new());
        assert_eq!(alarm.playback().plays(), 0);
    }

    #[test]
    fn rearming_silences_the_previous_firing() {
        let now = Local::now();
        let mut alarm = controller();
        alarm.start(1, now).unwrap();
        alarm.tick(now + Duration::seconds(1));
        alarm.on_playback_segment_ended();
        assert_eq!(alarm.state().play_count(), 1);

        alarm.playback_mut().calls.clear();
        alarm.start(60, now).unwrap();
        assert_eq!(alarm.playback().calls, vec![Call::Stop, Call::SeekToStart]);
        assert_eq!(alarm.state().play_count(), 0);
        assert!(alarm.state().armed());
        // the end of the silenced segment must not count toward the new cycle
        assert_eq!(alarm.on_playback_segment_ended(), SegmentOutcome::Ignored);
    }
}
