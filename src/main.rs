use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use countdown_clock::{
    alarm, audio::spawn_audio_thread, config::Config, duration::DurationSelector, Clock,
};
use eframe::{egui, run_native};
use log::{error, info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// config file to use instead of the one in the user config directory
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// write the default config
    Init {
        /// overwrite an existing config
        #[clap(long, short)]
        force: bool,
    },
    /// play this file when the alarm goes off
    SetSound { path: PathBuf },
    /// open the clock with a countdown already running
    Start {
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
        hours: u8,
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=59))]
        minutes: u8,
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=59))]
        seconds: u8,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    // a clock without a log file is still a clock
    if let Err(err) = simple_file_logger::init_logger!("countdown_clock") {
        eprintln!("couldn't initialize logger: {err:?}");
    }

    let args = Args::parse();
    let config_path = match args.config {
        Some(path) => path,
        None => Config::config_path()?,
    };

    let mut preset = None;
    match args.command {
        Some(Command::Init { force }) => {
            if force || !config_path.exists() {
                Config::new().save(&config_path)?;
                println!("wrote default config to {}", config_path.display());
            } else {
                println!(
                    "config already exists at {} (use --force to overwrite)",
                    config_path.display()
                );
            }
            return Ok(());
        }
        Some(Command::SetSound { path }) => {
            let path = std::fs::canonicalize(&path)
                .inspect_err(|err| error!("couldn't find sound {}: {err}", path.display()))?;
            let mut config = Config::load_or_default(&config_path);
            config.sound = Some(path);
            config.save(&config_path)?;
            return Ok(());
        }
        Some(Command::Start {
            hours,
            minutes,
            seconds,
        }) => {
            let selector = DurationSelector::from_hms(hours, minutes, seconds);
            alarm::validate_duration(selector.total_seconds())
                .inspect_err(|err| warn!("rejected countdown preset: {err}"))?;
            preset = Some(selector);
        }
        None => {}
    }

    let config = Config::load_or_default(&config_path);
    let (playback, events) = spawn_audio_thread(config.sound.clone(), config.volume);
    let mut clock = Clock::new(config, config_path, playback, events);
    if let Some(selector) = preset {
        clock.arm(selector, chrono::Local::now())?;
    }

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(320.0, 420.0)),
        ..Default::default()
    };
    info!("starting countdown clock");
    // run the gui
    run_native(
        "Countdown Clock",
        native_options,
        Box::new(move |_| Box::new(clock)),
    )
    .map_err(|e| e.into())
}
