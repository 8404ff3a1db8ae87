use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use duet_lib::Player;

const VOLUME_STEP: u32 = 5;

pub struct StatusSnapshot {
    pub text: String,
    /// Progress through the track, `0.0..=1.0`.
    pub ratio: f64,
    pub label: String,
}

pub struct StatusArgs {
    pub position: u64,
    pub duration: f64,
    pub playing: bool,
    pub stopping: bool,
    pub volume: u32,
    pub performer: String,
    pub broadcast: String,
    #[cfg(feature = "debug")]
    pub session: u64,
    #[cfg(feature = "debug")]
    pub fade_gain: f32,
    #[cfg(feature = "debug")]
    pub stream_starts: u64,
}

pub fn status_text(args: StatusArgs) -> StatusSnapshot {
    let state = if args.stopping {
        "⏸ Pausing"
    } else if args.playing {
        "▶ Playing"
    } else {
        "⏸ Paused"
    };
    let ratio = if args.duration > 0.0 {
        (args.position as f64 / args.duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let label = format!(
        "{} / {}",
        format_time(args.position as f64),
        format_time(args.duration)
    );

    #[allow(unused_mut)]
    let mut text = format!(
        "{}   volume: {}%\nPerformer: {}\nBroadcast: {}",
        state, args.volume, args.performer, args.broadcast
    );
    #[cfg(feature = "debug")]
    text.push_str(&format!(
        "\nsession: {} | fade gain: {:.3} | stream starts: {}",
        args.session, args.fade_gain, args.stream_starts
    ));

    StatusSnapshot { text, ratio, label }
}

/// Wait up to `poll` for a key and apply it.
///
/// Returns `false` when the user asked to quit.
pub fn handle_key_event(player: &Player, poll: Duration, skip_seconds: u64) -> bool {
    if event::poll(poll).unwrap_or(false) {
        if let Ok(Event::Key(key)) = event::read() {
            if key.kind != KeyEventKind::Press {
                return true;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    player.stop();
                    return false;
                }
                KeyCode::Char(' ') => player.play_pause(),
                KeyCode::Char('s') | KeyCode::Char('S') => player.stop(),
                KeyCode::Left => player.rewind(skip_seconds),
                KeyCode::Right => player.forward(skip_seconds),
                KeyCode::Up => {
                    player.set_master_volume(player.master_volume().saturating_add(VOLUME_STEP))
                }
                KeyCode::Down => {
                    player.set_master_volume(player.master_volume().saturating_sub(VOLUME_STEP))
                }
                _ => {}
            }
        }
    }

    true
}

/// `HH:MM:SS`, truncating fractional seconds.
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(position: u64, duration: f64) -> StatusArgs {
        StatusArgs {
            position,
            duration,
            playing: true,
            stopping: false,
            volume: 70,
            performer: "Headphones".to_string(),
            broadcast: "CABLE Input".to_string(),
            #[cfg(feature = "debug")]
            session: 3,
            #[cfg(feature = "debug")]
            fade_gain: 1.0,
            #[cfg(feature = "debug")]
            stream_starts: 2,
        }
    }

    #[test]
    fn times_are_hours_minutes_seconds() {
        assert_eq!(format_time(0.0), "00:00:00");
        assert_eq!(format_time(59.9), "00:00:59");
        assert_eq!(format_time(3_725.0), "01:02:05");
        assert_eq!(format_time(f64::NAN), "00:00:00");
    }

    #[test]
    fn status_reports_progress() {
        let status = status_text(args(30, 120.0));
        assert_eq!(status.label, "00:00:30 / 00:02:00");
        assert!((status.ratio - 0.25).abs() < 1e-9);
        assert!(status.text.contains("▶ Playing"));
        assert!(status.text.contains("volume: 70%"));
    }

    #[test]
    fn empty_tracks_have_no_progress() {
        assert_eq!(status_text(args(0, 0.0)).ratio, 0.0);
    }
}
