use crate::types::Coords;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_STORE: &str = "mapty.db";
const DEFAULT_KIND: &str = "running";

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts at map locations"
)]
pub struct Cli {
    /// SQLite file holding the stored workouts.
    #[arg(long, env = "MAPTY_STORE", default_value = DEFAULT_STORE, global = true)]
    pub store: PathBuf,

    /// Keep workouts in memory only; nothing is read or written on disk.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Current position as LAT,LNG. Without it the map is not loaded.
    #[arg(long, env = "MAPTY_POSITION", value_name = "LAT,LNG", global = true)]
    pub position: Option<Coords>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Click the map at a location and submit the workout form.
    Add {
        /// Workout type: running or cycling.
        #[arg(long = "type", value_name = "TYPE", default_value = DEFAULT_KIND)]
        kind: String,

        /// Where the map was clicked.
        #[arg(long, value_name = "LAT,LNG")]
        at: Coords,

        /// Distance in km.
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        distance: String,

        /// Duration in minutes.
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        duration: String,

        /// Steps per minute (running).
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        cadence: String,

        /// Elevation gain in meters (cycling).
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        elevation: String,
    },

    /// Show the workout list (the default).
    List,

    /// Centre the map on one workout.
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Print the stored JSON snapshot.
    Export,

    /// Delete every stored workout.
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "mapty",
            "--position",
            "39,-12",
            "add",
            "--type",
            "cycling",
            "--at",
            "39.1,-12.1",
            "--distance",
            "27",
            "--duration",
            "95",
            "--elevation",
            "-20",
        ])
        .unwrap();

        assert_eq!(cli.position, Some(Coords::new(39.0, -12.0)));
        match cli.cmd {
            Some(Cmd::Add {
                kind,
                at,
                distance,
                elevation,
                cadence,
                ..
            }) => {
                assert_eq!(kind, "cycling");
                assert_eq!(at, Coords::new(39.1, -12.1));
                assert_eq!(distance, "27");
                assert_eq!(elevation, "-20");
                assert!(cadence.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_bad_coords_rejected() {
        assert!(Cli::try_parse_from(["mapty", "add", "--at", "north"]).is_err());
    }
}
