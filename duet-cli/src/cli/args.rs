//! CLI argument definitions for `duet`.

use clap::{value_parser, Arg, ArgAction, Command};
use duet_lib::playback::DeviceId;

fn device_arg(name: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .short(short)
        .value_name("DEVICE")
        .required(true)
        .value_parser(|value: &str| value.parse::<DeviceId>())
        .help(help)
}

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    Command::new("duet")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Play a guide mix to the performer and the backing track to a broadcast device")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("play")
                .about("Load a backing track and a vocal track and play them")
                .arg(
                    Arg::new("BACKING")
                        .help("Backing track (instrumental) file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("VOCAL")
                        .help("Guide vocal file, mixed into the performer output only")
                        .required(true)
                        .index(2),
                )
                .arg(device_arg(
                    "performer",
                    'p',
                    "Device for backing plus vocal: 'default', an index from `duet devices` or a name",
                ))
                .arg(device_arg(
                    "broadcast",
                    'b',
                    "Device for the backing track alone, e.g. a virtual cable",
                ))
                .arg(
                    Arg::new("volume")
                        .long("volume")
                        .short('v')
                        .value_name("PERCENT")
                        .value_parser(value_parser!(u32).range(0..=100))
                        .help("Master volume in percent [default: from settings]"),
                )
                .arg(
                    Arg::new("seek")
                        .long("seek")
                        .short('s')
                        .value_name("SECONDS")
                        .value_parser(value_parser!(u64))
                        .help("Start at the given time in seconds"),
                )
                .arg(
                    Arg::new("settings")
                        .long("settings")
                        .value_name("PATH")
                        .help("Path to a JSON settings file (see `duet create settings-json`)"),
                )
                .arg(
                    Arg::new("fade-ms")
                        .long("fade-ms")
                        .value_name("MS")
                        .value_parser(value_parser!(u64))
                        .help("Fade-in and pause fade-out length, overriding the settings file"),
                )
                .arg(
                    Arg::new("fade-alpha")
                        .long("fade-alpha")
                        .value_name("ALPHA")
                        .value_parser(value_parser!(f64))
                        .help("Fade curve steepness, overriding the settings file"),
                )
                .arg(
                    Arg::new("scrub-ms")
                        .long("scrub-ms")
                        .value_name("MS")
                        .value_parser(value_parser!(u64))
                        .help("Quiet period before repeated seeks restart playback"),
                )
                .arg(
                    Arg::new("block-frames")
                        .long("block-frames")
                        .value_name("FRAMES")
                        .value_parser(value_parser!(u32))
                        .help("Hardware block size in frames; 0 uses the host default"),
                )
                .arg(
                    Arg::new("quiet")
                        .long("quiet")
                        .short('q')
                        .action(ArgAction::SetTrue)
                        .help("No TUI; exit when playback ends"),
                ),
        )
        .subcommand(
            Command::new("devices")
                .about("List output devices")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the list as JSON"),
                ),
        )
        .subcommand(
            Command::new("create")
                .about("Emit default JSON payloads")
                .subcommand_required(true)
                .subcommand(
                    Command::new("settings-json").about("Print the default settings JSON payload"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn play_parses_devices_and_volume() {
        let matches = build_cli()
            .try_get_matches_from([
                "duet",
                "play",
                "backing.mp3",
                "vocal.wav",
                "--performer",
                "2",
                "--broadcast",
                "CABLE Input",
                "--volume",
                "55",
            ])
            .unwrap();
        let (_, play) = matches.subcommand().unwrap();
        assert_eq!(play.get_one::<DeviceId>("performer"), Some(&DeviceId::Index(2)));
        assert_eq!(
            play.get_one::<DeviceId>("broadcast"),
            Some(&DeviceId::Named("CABLE Input".to_string()))
        );
        assert_eq!(play.get_one::<u32>("volume"), Some(&55));
    }

    #[test]
    fn play_parses_tuning_overrides() {
        let matches = build_cli()
            .try_get_matches_from([
                "duet",
                "play",
                "a.wav",
                "b.wav",
                "-p",
                "0",
                "-b",
                "1",
                "--fade-ms",
                "120",
                "--fade-alpha",
                "3.5",
                "--scrub-ms",
                "80",
                "--block-frames",
                "0",
            ])
            .unwrap();
        let (_, play) = matches.subcommand().unwrap();
        assert_eq!(play.get_one::<u64>("fade-ms"), Some(&120));
        assert_eq!(play.get_one::<f64>("fade-alpha"), Some(&3.5));
        assert_eq!(play.get_one::<u64>("scrub-ms"), Some(&80));
        assert_eq!(play.get_one::<u32>("block-frames"), Some(&0));
    }

    #[test]
    fn volume_above_one_hundred_is_rejected() {
        let result = build_cli().try_get_matches_from([
            "duet", "play", "a.wav", "b.wav", "-p", "0", "-b", "1", "--volume", "120",
        ]);
        assert!(result.is_err());
    }
}
