use chrono::{NaiveTime, Timelike};
use eframe::egui::{Color32, Pos2, Sense, Stroke, Vec2, Widget};

// the face is laid out on a 180x180 canvas and scaled to whatever space it gets
const CANVAS: f32 = 180.;
const FACE_RADIUS: f32 = 80.;
const RIM_WIDTH: f32 = 6.;
const MARKER_DISTANCE: f32 = 65.;
const MARKER_RADIUS: f32 = 4.;
const PIVOT_RADIUS: f32 = 6.;

pub const FACE_FILL: Color32 = Color32::from_rgb(0xff, 0xfb, 0xe7);
pub const GOLD: Color32 = Color32::from_rgb(0xf9, 0xd4, 0x23);
pub const ACCENT: Color32 = Color32::from_rgb(0xff, 0x4e, 0x50);

/// hand angles in degrees, clockwise from 12 o'clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandAngles {
    pub hour: f32,
    pub minute: f32,
    pub second: f32,
}

impl HandAngles {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn at(time: NaiveTime) -> Self {
        let hour = (time.hour() % 12) as f32;
        let minute = time.minute() as f32;
        let second = time.second() as f32;
        Self {
            hour: (hour + minute / 60.) * 30.,
            minute: (minute + second / 60.) * 6.,
            second: second * 6.,
        }
    }
}

struct Hand {
    length: f32,
    tail: f32,
    width: f32,
    color: Color32,
}

const HOUR_HAND: Hand = Hand {
    length: 40.,
    tail: 10.,
    width: 8.,
    color: ACCENT,
};
const MINUTE_HAND: Hand = Hand {
    length: 60.,
    tail: 15.,
    width: 5.,
    color: GOLD,
};
const SECOND_HAND: Hand = Hand {
    length: 65.,
    tail: 20.,
    width: 2.,
    color: ACCENT,
};

/// unit vector pointing at `degrees` clockwise from 12 o'clock (screen y grows down)
fn direction(degrees: f32) -> Vec2 {
    Vec2::angled((degrees - 90.).to_radians())
}

/// analog clock showing `time`
pub struct ClockFace {
    time: NaiveTime,
    size: Option<f32>,
}

impl ClockFace {
    #[must_use]
    pub const fn new(time: NaiveTime) -> Self {
        Self { time, size: None }
    }

    #[must_use]
    pub const fn size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }
}

impl Widget for ClockFace {
    fn ui(self, ui: &mut eframe::egui::Ui) -> eframe::egui::Response {
        let size = self.size.unwrap_or(CANVAS);
        let (rect, response) = ui.allocate_exact_size(Vec2::splat(size), Sense::hover());
        let scale = size / CANVAS;
        let center = rect.center();
        let painter = ui.painter();

        painter.circle_filled(center, FACE_RADIUS * scale, FACE_FILL);
        painter.circle_stroke(
            center,
            FACE_RADIUS * scale,
            Stroke::new(RIM_WIDTH * scale, GOLD),
        );

        for i in 0..12u8 {
            let at = center + direction(f32::from(i) * 30.) * MARKER_DISTANCE * scale;
            // 12, 3, 6 and 9 stand out
            let color = if i % 3 == 0 { ACCENT } else { GOLD };
            painter.circle_filled(at, MARKER_RADIUS * scale, color);
        }

        let angles = HandAngles::at(self.time);
        for (hand, angle) in [
            (HOUR_HAND, angles.hour),
            (MINUTE_HAND, angles.minute),
            (SECOND_HAND, angles.second),
        ] {
            let dir = direction(angle);
            let tip: Pos2 = center + dir * hand.length * scale;
            let tail: Pos2 = center - dir * hand.tail * scale;
            painter.line_segment([tail, tip], Stroke::new(hand.width * scale, hand.color));
        }

        painter.circle_filled(center, PIVOT_RADIUS * scale, GOLD);
        response
    }
}
