use chrono::{DateTime, Local};

use crate::alarm::AlarmState;

pub const IDLE_DISPLAY: &str = "00:00:00";

/// zero pads to two digits
#[must_use]
pub fn pad(n: impl Into<i64>) -> String {
    format!("{:02}", n.into())
}

/// remaining time of the armed alarm as `HH:MM:SS`.
///
/// rounds up to the next whole second so the display only reads zero once the alarm is due.
#[must_use]
pub fn format_remaining(now: DateTime<Local>, state: &AlarmState) -> String {
    let Some(target) = state.target_time().filter(|_| state.armed()) else {
        return IDLE_DISPLAY.to_string();
    };
    // whole nanoseconds, a countdown is at most two hours so this never overflows
    let nanos = (target - now).num_nanoseconds().unwrap_or(i64::MAX).max(0);
    let remaining = nanos / 1_000_000_000 + i64::from(nanos % 1_000_000_000 != 0);
    format!(
        "{}:{}:{}",
        pad(remaining / 3600),
        pad(remaining % 3600 / 60),
        pad(remaining % 60)
    )
}
