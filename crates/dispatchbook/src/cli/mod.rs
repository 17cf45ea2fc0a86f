//! Command-line interface for dispatchbook.
//!
//! This module provides the CLI structure for the `dbook` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddRecord, ConfigCommand, DriverCommand, HistoryCommand, RecordCommand, RecordFields,
    ShowCommand, StatusCommand,
};

/// dbook - Keep the daily delivery worksheet
///
/// Records deliveries on the current worksheet, archives finished
/// worksheets into a read-only history, and keeps a roster of titular
/// drivers with their default localities.
#[derive(Debug, Parser)]
#[command(name = "dbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the database file, overriding the configuration
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add, change or delete records on the current worksheet
    #[command(subcommand)]
    Record(RecordCommand),

    /// Move the current records into a new archived worksheet
    Archive,

    /// Show the current worksheet or an archived one
    Show(ShowCommand),

    /// List archived worksheets, most recent first
    History(HistoryCommand),

    /// Manage the titular driver roster
    #[command(subcommand)]
    Driver(DriverCommand),

    /// Show database and collection status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::WorksheetSelection;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            db: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "dbook");
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;

        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_record_add() {
        let args = vec![
            "dbook", "record", "add", "--driver", "Ana", "--party", "Kiosco", "--party",
            "Farmacia", "--system", "12", "--complicated",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Record(RecordCommand::Add(add)) = cli.command else {
            panic!("expected record add");
        };
        let draft = add.to_draft();
        assert_eq!(draft.driver_name, "Ana");
        assert_eq!(draft.parties, vec!["Kiosco", "Farmacia"]);
        assert_eq!(draft.system_packages, 12);
        assert!(draft.is_complicated);
        assert!(!draft.is_substitute);
    }

    #[test]
    fn test_parse_record_add_requires_driver() {
        let args = vec!["dbook", "record", "add", "--system", "3"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_record_update_explicit_false() {
        let args = vec!["dbook", "record", "update", "r1", "--substitute", "false"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Record(RecordCommand::Update { id, driver, fields }) = cli.command else {
            panic!("expected record update");
        };
        assert_eq!(id, "r1");
        assert!(driver.is_none());
        assert_eq!(fields.substitute, Some(false));
        assert!(fields.system.is_none());
    }

    #[test]
    fn test_parse_record_delete() {
        let args = vec!["dbook", "record", "delete", "r1"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Record(RecordCommand::Delete { id }) if id == "r1"
        ));
    }

    #[test]
    fn test_parse_archive() {
        let cli = Cli::try_parse_from(vec!["dbook", "archive"]).unwrap();
        assert!(matches!(cli.command, Command::Archive));
    }

    #[test]
    fn test_parse_show_defaults_to_current() {
        let cli = Cli::try_parse_from(vec!["dbook", "show"]).unwrap();
        let Command::Show(show) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(show.worksheet, WorksheetSelection::Current);
        assert!(!show.json);
    }

    #[test]
    fn test_parse_show_worksheet() {
        let args = vec!["dbook", "show", "--worksheet", "w1", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Show(show) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(show.worksheet, WorksheetSelection::Viewing("w1".to_string()));
        assert!(show.json);
    }

    #[test]
    fn test_parse_driver_add() {
        let args = vec!["dbook", "driver", "add", "--name", "Ana", "--locality", "Norte"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Driver(DriverCommand::Add { .. })
        ));
    }

    #[test]
    fn test_parse_with_db() {
        let args = vec!["dbook", "--db", "/tmp/book.db", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/book.db")));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["dbook", "-c", "/custom/config.toml", "history"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose_and_quiet() {
        let cli = Cli::try_parse_from(vec!["dbook", "-vv", "status"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(vec!["dbook", "-q", "status"]).unwrap();
        assert!(cli.quiet);
    }
}
