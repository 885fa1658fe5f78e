use std::path::PathBuf;

use clap::{Parser, Subcommand};

const HELP_EPILOG: &str = r#"Config resolution order:
  1) --config/-c PATH
  2) $ARCSIGHT_CONFIG
  3) platform default, e.g. ~/.config/ARC-Sight/config.ini

Logging follows RUST_LOG (default: info).
"#;

#[derive(Debug, Parser)]
#[command(
    name = "arcsight-client",
    version,
    about = "Countdown and alert agent for ARC Raiders map events",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    /// Path to config.ini
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Optional subcommand. Without one, runs the agent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the schedule once and print every tab
    Status,
    /// Show or edit settings
    #[command(subcommand)]
    Config(ConfigCommand),
    /// List installed translation files
    Languages,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved config path and its values
    Show,
    /// Validate and store one value, e.g. `config set notify_minutes 10`
    Set { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::parse_from(["arcsight-client", "config", "set", "alerts", "Harvester@*"]);
        match cli.command {
            Some(Command::Config(ConfigCommand::Set { key, value })) => {
                assert_eq!(key, "alerts");
                assert_eq!(value, "Harvester@*");
            }
            other => panic!("unexpected {other:?}"),
        }

        let cli = Cli::parse_from(["arcsight-client", "status", "-c", "/tmp/a.ini"]);
        assert!(matches!(cli.command, Some(Command::Status)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/a.ini")));

        assert!(Cli::parse_from(["arcsight-client"]).command.is_none());
    }

    #[test]
    fn verifies_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
