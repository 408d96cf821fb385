use std::ops::RangeInclusive;

pub const MAX_HOURS: u8 = 2;
pub const MAX_MINUTES: u8 = 59;
pub const MAX_SECONDS: u8 = 59;

/// the hours, minutes and seconds picked for the next countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationSelector {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl DurationSelector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// out of range parts get clamped
    #[must_use]
    pub fn from_hms(hours: u8, minutes: u8, seconds: u8) -> Self {
        let mut selector = Self::new();
        selector.set_hours(hours);
        selector.set_minutes(minutes);
        selector.set_seconds(seconds);
        selector
    }

    #[must_use]
    pub const fn hour_options() -> RangeInclusive<u8> {
        0..=MAX_HOURS
    }

    #[must_use]
    pub const fn minute_options() -> RangeInclusive<u8> {
        0..=MAX_MINUTES
    }

    #[must_use]
    pub const fn second_options() -> RangeInclusive<u8> {
        0..=MAX_SECONDS
    }

    #[must_use]
    pub const fn hours(&self) -> u8 {
        self.hours
    }

    #[must_use]
    pub const fn minutes(&self) -> u8 {
        self.minutes
    }

    #[must_use]
    pub const fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn set_hours(&mut self, hours: u8) {
        self.hours = hours.min(MAX_HOURS);
    }

    pub fn set_minutes(&mut self, minutes: u8) {
        self.minutes = minutes.min(MAX_MINUTES);
    }

    pub fn set_seconds(&mut self, seconds: u8) {
        self.seconds = seconds.min(MAX_SECONDS);
    }

    #[must_use]
    pub fn total_seconds(&self) -> i64 {
        i64::from(self.hours) * 3600 + i64::from(self.minutes) * 60 + i64::from(self.seconds)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
