#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

use std::{fmt::Write, ops::BitOrAssign, path::PathBuf};

use audio::ChannelPlayback;
use chrono::{DateTime, Local};
use config::{Config, Theme};
use eframe::egui::{
    self, Align2, Button, CentralPanel, Layout, RichText, Slider, TopBottomPanel, Window,
};
use log::error;

pub mod alarm;
pub mod audio;
pub mod clock_face;
pub mod communication;
pub mod config;
pub mod countdown;
pub mod duration;
/// implementation of duration editing for egui
pub mod duration_edit;
pub mod frame;

use clock_face::ClockFace;
use communication::PlaybackEvent;
use frame::FrameLoop;

/// formats the header clock, a broken format string falls back to `HH:MM:SS`
#[must_use]
pub fn header_time(now: DateTime<Local>, time_format: &str) -> String {
    let mut formatted = String::new();
    if write!(formatted, "{}", now.format(time_format)).is_err() {
        return now.format("%H:%M:%S").to_string();
    }
    formatted
}

/// what the settings window has to do with an edit made this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SettingsChange {
    /// push to the audio thread
    apply: bool,
    /// write the config file
    persist: bool,
}

impl SettingsChange {
    const BOTH: Self = Self {
        apply: true,
        persist: true,
    };

    /// a slider is applied live while dragged but only written out once it is let go
    const fn from_slider(changed: bool, dragging: bool, drag_released: bool) -> Self {
        Self {
            apply: changed,
            persist: drag_released || (changed && !dragging),
        }
    }
}

impl BitOrAssign for SettingsChange {
    fn bitor_assign(&mut self, rhs: Self) {
        self.apply |= rhs.apply;
        self.persist |= rhs.persist;
    }
}

pub struct Clock {
    config: Config,
    config_path: PathBuf,
    frames: FrameLoop<ChannelPlayback>,
    in_config: bool,
}

impl Clock {
    #[must_use]
    pub fn new(
        config: Config,
        config_path: PathBuf,
        playback: ChannelPlayback,
        events: std::sync::mpsc::Receiver<PlaybackEvent>,
    ) -> Self {
        Self {
            config,
            config_path,
            frames: FrameLoop::new(playback, events),
            in_config: false,
        }
    }

    /// arms the countdown before the first frame, used for presets from the command line
    ///
    /// # Errors
    /// when the duration is out of range
    pub fn arm(
        &mut self,
        selector: duration::DurationSelector,
        now: DateTime<Local>,
    ) -> Result<(), alarm::AlarmError> {
        *self.frames.selector_mut() = selector;
        alarm::validate_duration(selector.total_seconds())?;
        self.frames.submit(now);
        Ok(())
    }

    fn render_settings(&mut self, ctx: &egui::Context) {
        let mut change = SettingsChange::default();
        Window::new("settings ⚙")
            .open(&mut self.in_config)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.label("Alarm sound");
                ui.horizontal(|ui| {
                    ui.label(
                        self.config
                            .sound
                            .as_ref()
                            .map_or_else(|| "built in tone".to_string(), |p| p.display().to_string()),
                    );
                    if ui.button("Pick").clicked() {
                        let file_dialog = rfd::FileDialog::new()
                            .set_title("Pick alarm sound")
                            .add_filter("audio", &["mp3", "wav", "ogg", "flac"]);
                        let file_dialog = match Config::audio_dir() {
                            Some(audio_path) => file_dialog.set_directory(audio_path),
                            None => file_dialog,
                        };
                        if let Some(path) = file_dialog.pick_file() {
                            self.config.sound = Some(path);
                            change = SettingsChange::BOTH;
                        }
                    }
                    if self.config.sound.is_some() && ui.button("Use tone").clicked() {
                        self.config.sound = None;
                        change = SettingsChange::BOTH;
                    }
                });
                let volume = ui.add(
                    Slider::new(&mut self.config.volume, 0.0..=100.0)
                        .integer()
                        .suffix("%")
                        .text("volume"),
                );
                change |= SettingsChange::from_slider(
                    volume.changed(),
                    volume.dragged(),
                    volume.drag_released(),
                );
                ui.horizontal(|ui| {
                    ui.label("Time format");
                    if ui
                        .text_edit_singleline(&mut self.config.time_format)
                        .lost_focus()
                    {
                        // the header reads the format directly, only the file is behind
                        change.persist = true;
                    }
                });
            });
        if change.apply {
            self.frames
                .playback()
                .configure(self.config.sound.clone(), self.config.volume);
        }
        if change.persist {
            self.save();
        }
    }

    fn render_header(&mut self, ctx: &egui::Context, now: DateTime<Local>) {
        TopBottomPanel::top("time_and_ctrl").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let theme_btn = ui.add(Button::new({
                    if self.config.theme == Theme::Dark {
                        "🌞"
                    } else {
                        "🌙"
                    }
                }));
                if theme_btn.clicked() {
                    self.config.theme = !self.config.theme;
                    self.save();
                }
                ui.label(format!("Time: {}", header_time(now, &self.config.time_format)));
                ui.with_layout(Layout::right_to_left(eframe::emath::Align::Min), |ui| {
                    if ui.button("⚙").on_hover_text("settings").clicked() {
                        self.in_config = true;
                    }
                });
            });
        });
    }

    fn render_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.frames.notice() else {
            return;
        };
        let message = notice.to_string();
        let mut dismissed = false;
        Window::new("Alarm")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("ok").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.frames.dismiss_notice();
        }
    }

    fn save(&self) {
        if let Err(err) = self.config.save(&self.config_path) {
            error!("{err}");
        }
    }
}

impl eframe::App for Clock {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // read the clock once, everything in this frame agrees on the time
        let now = Local::now();
        let display = self.frames.frame(now, ctx);

        ctx.set_visuals(self.config.theme.into());
        if self.in_config {
            self.render_settings(ctx);
        }
        self.render_notice(ctx);
        self.render_header(ctx, now);
        CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add(ClockFace::new(now.time()).size(180.0));
                ui.label(RichText::new(display).monospace().size(36.0));
                ui.separator();
                self.frames.selector_mut().render_duration_editor(ui);
                ui.horizontal(|ui| {
                    if ui.button("Start").clicked() {
                        self.frames.submit(now);
                    }
                    if ui.button("Reset").clicked() {
                        self.frames.reset();
                    }
                });
            });
        });
    }
}
