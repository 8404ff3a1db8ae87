use std::{error::Error, io, sync::Arc, thread::sleep};

use clap::ArgMatches;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use duet_lib::playback::{list_output_devices, CpalBackend, DeviceId, DevicePair};
use duet_lib::track::load_track_pair;
use duet_lib::{Player, PlayerSettings};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::logging::LogBuffer;
use crate::{controls, logging, ui};

pub type CliResult<T> = Result<T, Box<dyn Error>>;

pub fn run(args: &ArgMatches, log_buffer: LogBuffer) -> CliResult<i32> {
    match args.subcommand() {
        Some(("play", play_args)) => play(play_args, log_buffer),
        Some(("devices", device_args)) => devices(device_args),
        Some(("create", create_args)) => create(create_args),
        _ => {
            error!("no command given");
            Ok(-1)
        }
    }
}

fn create(args: &ArgMatches) -> CliResult<i32> {
    match args.subcommand() {
        Some(("settings-json", _)) => {
            println!("{}", PlayerSettings::default().to_json_pretty()?);
            Ok(0)
        }
        _ => {
            error!("unknown payload");
            Ok(-1)
        }
    }
}

fn devices(args: &ArgMatches) -> CliResult<i32> {
    let devices = list_output_devices()?;

    if args.get_flag("json") {
        let list: Vec<serde_json::Value> = devices
            .iter()
            .map(|device| {
                serde_json::json!({
                    "index": device.index,
                    "name": device.name,
                    "default_sample_rate": device.default_sample_rate,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(0);
    }

    if devices.is_empty() {
        println!("No output devices found.");
    }
    for device in devices {
        println!("{:>3}: {}", device.index, device.label());
    }
    Ok(0)
}

fn play(args: &ArgMatches, log_buffer: LogBuffer) -> CliResult<i32> {
    info!("Starting duet");

    let backing = args
        .get_one::<String>("BACKING")
        .ok_or("missing backing track")?;
    let vocal = args
        .get_one::<String>("VOCAL")
        .ok_or("missing vocal track")?;
    let performer = args
        .get_one::<DeviceId>("performer")
        .cloned()
        .ok_or("missing performer device")?;
    let broadcast = args
        .get_one::<DeviceId>("broadcast")
        .cloned()
        .ok_or("missing broadcast device")?;
    let quiet = args.get_flag("quiet");

    let settings = match args.get_one::<String>("settings") {
        Some(path) => PlayerSettings::from_json_file(path)?,
        None => PlayerSettings::default(),
    };

    let devices = DevicePair::new(performer, broadcast);

    let tracks = load_track_pair(backing, vocal, &settings, |percent| {
        info!("loading tracks: {}%", percent)
    })?;

    let player = Player::new(Arc::new(CpalBackend::new()), settings.clone());
    if let Some(volume) = args.get_one::<u32>("volume") {
        player.set_master_volume(*volume);
    }
    apply_tuning(&player, args);
    player.load(tracks, devices.clone());
    if let Some(seek) = args.get_one::<u64>("seek") {
        player.seek(*seek);
    }
    player.start(player.current_position())?;

    if quiet {
        while player.is_playing() {
            sleep(settings.tick());
            player.tick();
            if let Some(err) = player.take_error() {
                return Err(err.into());
            }
        }
        return Ok(0);
    }

    let _stderr_capture = logging::capture_stderr(log_buffer.clone());
    let _raw_mode = RawModeGuard::enable().ok();
    let mut terminal = {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, EnterAlternateScreen, cursor::Hide);
        Terminal::new(CrosstermBackend::new(stdout)).ok()
    };

    let performer = devices.performer.to_string();
    let broadcast = devices.broadcast.to_string();

    loop {
        player.tick();
        if let Some(err) = player.take_error() {
            error!("{}", err);
        }

        if let Some(term) = terminal.as_mut() {
            let log_lines = logging::snapshot(&log_buffer);
            let status = controls::status_text(controls::StatusArgs {
                position: player.display_position(),
                duration: player.current_duration(),
                playing: player.is_playing(),
                stopping: player.is_stopping(),
                volume: player.master_volume(),
                performer: performer.clone(),
                broadcast: broadcast.clone(),
                #[cfg(feature = "debug")]
                session: player.session().generation(),
                #[cfg(feature = "debug")]
                fade_gain: player.fade_gain(),
                #[cfg(feature = "debug")]
                stream_starts: player.stream_starts(),
            });
            ui::draw_status(term, &status, &log_lines);
        }

        if !controls::handle_key_event(&player, settings.tick(), settings.skip_seconds) {
            break;
        }
    }

    // Restore the terminal state before exiting.
    if let Some(mut term) = terminal {
        let _ = term.show_cursor();
        let stdout = term.backend_mut();
        let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
    }

    Ok(0)
}

/// Apply command-line overrides on top of the settings file.
fn apply_tuning(player: &Player, args: &ArgMatches) {
    if let Some(fade_ms) = args.get_one::<u64>("fade-ms") {
        player.set_fade_ms(*fade_ms);
    }
    if let Some(alpha) = args.get_one::<f64>("fade-alpha") {
        player.set_fade_alpha(*alpha);
    }
    if let Some(quiet_ms) = args.get_one::<u64>("scrub-ms") {
        player.set_scrub_quiet_ms(*quiet_ms);
    }
    if let Some(block_frames) = args.get_one::<u32>("block-frames") {
        player.set_block_frames(Some(*block_frames));
    }
    info!("playback settings: {:?}", player.settings());
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
