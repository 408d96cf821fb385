//! one step of the clock, run once per displayed frame

use std::{
    collections::VecDeque,
    sync::mpsc::{Receiver, TryRecvError},
};

use chrono::{DateTime, Local};
use eframe::egui;
use log::{debug, info};

use crate::{
    alarm::{AlarmController, AlarmState, Notice, SegmentOutcome, TickOutcome},
    communication::{Playback, PlaybackEvent},
    countdown,
    duration::DurationSelector,
};

/// asks the host to run the loop again
pub trait FrameScheduler {
    fn schedule_next_frame(&self);
}

impl FrameScheduler for egui::Context {
    fn schedule_next_frame(&self) {
        self.request_repaint();
    }
}

/// the alarm, the duration picked for it and whatever the user still has to be told
pub struct FrameLoop<P> {
    alarm: AlarmController<P>,
    selector: DurationSelector,
    events: Receiver<PlaybackEvent>,
    notices: VecDeque<Notice>,
    events_closed: bool,
}

impl<P: Playback> FrameLoop<P> {
    #[must_use]
    pub fn new(playback: P, events: Receiver<PlaybackEvent>) -> Self {
        Self {
            alarm: AlarmController::new(playback),
            selector: DurationSelector::new(),
            events,
            notices: VecDeque::new(),
            events_closed: false,
        }
    }

    /// handles playback news, checks the alarm and returns the countdown text for this frame
    pub fn frame(&mut self, now: DateTime<Local>, scheduler: &impl FrameScheduler) -> String {
        self.drain_playback_events();
        let display = countdown::format_remaining(now, self.alarm.state());
        match self.alarm.tick(now) {
            TickOutcome::Waiting | TickOutcome::Fired | TickOutcome::AlreadyPending => {}
            TickOutcome::Failed(notice) => self.notices.push_back(notice),
        }
        scheduler.schedule_next_frame();
        display
    }

    /// arms the alarm with the selected duration, a bad duration becomes a notice
    pub fn submit(&mut self, now: DateTime<Local>) -> bool {
        match self.alarm.start(self.selector.total_seconds(), now) {
            Ok(()) => true,
            Err(err) => {
                info!("rejected countdown: {err}");
                self.notices.push_back(err.into());
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.alarm.reset();
        self.selector.reset();
    }

    #[must_use]
    pub const fn state(&self) -> &AlarmState {
        self.alarm.state()
    }

    #[must_use]
    pub const fn playback(&self) -> &P {
        self.alarm.playback()
    }

    #[must_use]
    pub const fn selector(&self) -> &DurationSelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut DurationSelector {
        &mut self.selector
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    fn drain_playback_events(&mut self) {
        while !self.events_closed {
            let event = match self.events.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("playback event channel closed");
                    self.events_closed = true;
                    break;
                }
            };
            match event {
                PlaybackEvent::Started => self.alarm.on_playback_started(),
                PlaybackEvent::SegmentEnded => match self.alarm.on_playback_segment_ended() {
                    SegmentOutcome::Failed(notice) => self.notices.push_back(notice),
                    SegmentOutcome::Ignored
                    | SegmentOutcome::Replaying
                    | SegmentOutcome::AlreadyPending
                    | SegmentOutcome::Done => {}
                },
                PlaybackEvent::Failed(error) => {
                    if let Some(notice) = self.alarm.on_playback_failed(error) {
                        self.notices.push_back(notice);
                    }
                }
            }
        }
    }
}
