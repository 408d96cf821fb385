use std::ops::RangeInclusive;

use eframe::egui::{self, ComboBox};

use crate::{countdown::pad, duration::DurationSelector};

impl DurationSelector {
    pub fn render_duration_editor(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut hours = self.hours();
            Self::render_part_selector(ui, "hours", &mut hours, Self::hour_options());
            self.set_hours(hours);
            ui.label(":");

            let mut minutes = self.minutes();
            Self::render_part_selector(ui, "minutes", &mut minutes, Self::minute_options());
            self.set_minutes(minutes);
            ui.label(":");

            let mut seconds = self.seconds();
            Self::render_part_selector(ui, "seconds", &mut seconds, Self::second_options());
            self.set_seconds(seconds);
        });
    }

    fn render_part_selector(
        ui: &mut egui::Ui,
        name: &str,
        value: &mut u8,
        options: RangeInclusive<u8>,
    ) {
        ui.vertical(|ui| {
            ui.label(name);
            ComboBox::from_id_source(name)
                .width(48.0)
                .selected_text(pad(*value))
                .show_ui(ui, |ui| {
                    for option in options {
                        ui.selectable_value(value, option, pad(option));
                    }
                });
        });
    }
}
