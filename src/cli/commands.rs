use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "attend",
    about = concat!("attend v", env!("CARGO_PKG_VERSION"), " - class attendance in a plain CSV file"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Date to open, DD-MM-YYYY (default: today)
    pub date: Option<String>,

    /// Use a different config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use a different attendance record file
    #[arg(long = "data-file", global = true, value_name = "PATH")]
    pub data_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show attendance statistics
    Stats(StatsArgs),
    /// Rename a subject in the record file
    Rename(RenameArgs),
    /// Print the config file path
    ConfigFile,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Group by weekday instead of subject
    #[arg(long)]
    pub weekday: bool,
    /// First date to count, DD-MM-YYYY (default: start_date from config)
    #[arg(long)]
    pub start: Option<String>,
    /// Last date to count, DD-MM-YYYY
    #[arg(long)]
    pub end: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Current subject name
    pub old: String,
    /// New subject name
    pub new: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_date_positional() {
        let cli = Cli::try_parse_from(["attend", "10-01-2024"]).unwrap();
        assert_eq!(cli.date.as_deref(), Some("10-01-2024"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_stats_with_global_flags() {
        let cli = Cli::try_parse_from([
            "attend",
            "stats",
            "--weekday",
            "--start",
            "01-01-2024",
            "--data-file",
            "/tmp/a.csv",
        ])
        .unwrap();
        assert_eq!(cli.data_file, Some(PathBuf::from("/tmp/a.csv")));
        match cli.command {
            Some(Commands::Stats(args)) => {
                assert!(args.weekday);
                assert!(!args.json);
                assert_eq!(args.start.as_deref(), Some("01-01-2024"));
                assert!(args.end.is_none());
            }
            _ => panic!("expected stats"),
        }
    }

    #[test]
    fn rename_needs_two_names() {
        assert!(Cli::try_parse_from(["attend", "rename", "Math"]).is_err());
        let cli = Cli::try_parse_from(["attend", "rename", "Math", "Maths"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Rename(RenameArgs { ref old, ref new })) if old == "Math" && new == "Maths"
        ));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
