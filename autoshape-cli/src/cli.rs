use std::path::{Path, PathBuf};

use clap::{Arg, ArgMatches, ColorChoice, Command};
use log::error;

/// Arguments shared by every stage that walks a mission tree.
fn mission_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("workspace")
            .short('w')
            .long("workspace")
            .value_name("DIRECTORY")
            .help("Mission workspace root")
            .required(true),
    )
    .arg(
        Arg::new("mission")
            .short('m')
            .long("mission")
            .value_name("NUMBER")
            .help("Mission number")
            .required(true),
    )
}

#[derive(Debug, Clone, Default)]
pub struct Cli {
    matches: ArgMatches,
}

impl Cli {
    pub fn new() -> Self {
        Self {
            matches: {
                Command::new("autoshape")
                    .version(env!("CARGO_PKG_VERSION"))
                    .about("Ground-track footprint pipeline for satellite imaging missions")
                    .arg_required_else_help(true)
                    .color(ColorChoice::Always)
                    .subcommand_required(true)
                    .subcommand(
                        mission_args(Command::new("daylight"))
                            .about("Label raw coasting arcs with orbit numbers and export per-orbit daylight segments")
                            .arg(
                                Arg::new("intervals")
                                    .short('i')
                                    .long("intervals")
                                    .value_name("FILEPATH")
                                    .help("Daylight interval table (CSV, start/end stamps)")
                                    .required(true),
                            )
                            .arg(
                                Arg::new("offset")
                                    .short('o')
                                    .long("offset")
                                    .value_name("NUMBER")
                                    .help("Correction added to the derived base orbit number"),
                            ),
                    )
                    .subcommand(
                        mission_args(Command::new("shapes"))
                            .about("Derive ground-track polylines and buffered footprints from daylight segments")
                            .arg(
                                Arg::new("swap-lens")
                                    .short('s')
                                    .long("swap-lens")
                                    .value_name("ORBIT")
                                    .help("Last orbit flown with the wide lens")
                                    .required(true),
                            ),
                    )
                    .subcommand(
                        mission_args(Command::new("google"))
                            .about("Render footprints as Google Earth KMZ overlays"),
                    )
                    .subcommand(
                        Command::new("calendar")
                            .about("Export daylight intervals as a calendar-import CSV")
                            .arg(
                                Arg::new("intervals")
                                    .short('i')
                                    .long("intervals")
                                    .value_name("FILEPATH")
                                    .help("Daylight interval table (CSV, start/end stamps)")
                                    .required(true),
                            )
                            .arg(
                                Arg::new("base")
                                    .short('b')
                                    .long("base")
                                    .value_name("ORBIT")
                                    .help("Orbit number of the first interval")
                                    .required(true),
                            )
                            .arg(
                                Arg::new("output")
                                    .short('o')
                                    .long("output")
                                    .value_name("FILEPATH")
                                    .help("Output CSV file")
                                    .required(true),
                            ),
                    )
                    .get_matches()
            },
        }
    }
    /// Returns selected stage and its matches.
    pub fn stage(&self) -> (&str, &ArgMatches) {
        self.matches.subcommand().unwrap()
    }
    pub fn workspace(matches: &ArgMatches) -> &Path {
        Path::new(matches.get_one::<String>("workspace").unwrap())
    }
    pub fn mission(matches: &ArgMatches) -> u32 {
        let text = matches.get_one::<String>("mission").unwrap();
        text.parse().unwrap_or_else(|_| {
            error!("invalid mission number \"{}\", using 0", text);
            0
        })
    }
    pub fn intervals_filepath(matches: &ArgMatches) -> &str {
        matches.get_one::<String>("intervals").unwrap()
    }
    pub fn offset(matches: &ArgMatches) -> i32 {
        if let Some(text) = matches.get_one::<String>("offset") {
            text.parse().unwrap_or_else(|_| {
                error!("invalid offset \"{}\", using 0", text);
                0
            })
        } else {
            0
        }
    }
    pub fn swap_lens(matches: &ArgMatches) -> &str {
        matches.get_one::<String>("swap-lens").unwrap()
    }
    pub fn base_orbit(matches: &ArgMatches) -> &str {
        matches.get_one::<String>("base").unwrap()
    }
    pub fn output_filepath(matches: &ArgMatches) -> PathBuf {
        PathBuf::from(matches.get_one::<String>("output").unwrap())
    }
}
