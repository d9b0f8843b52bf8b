//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

const AFTER_HELP: &str = "\
Quick Start:
  $ linkwatch notify /srv/app/current   # Report every swap of the 'current' symlink
  $ linkwatch serve --bind 127.0.0.1:8080
  $ kubectl get -w -o json svc web | linkwatch json-diff
  $ linkwatch watch-diff http://localhost:8001/api/v1/watch/namespaces/default/services/web";

#[derive(Parser, Debug)]
#[command(
    name = "linkwatch",
    version,
    about = "Watch for atomic symlink swaps, serve redirect fixtures, diff JSON streams",
    styles = clap_cargo_style(),
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Settings file to use instead of .linkwatch/settings.toml
    #[arg(short, long, global = true, env = "LINKWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create .linkwatch/settings.toml in the current directory
    Init {
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Config,

    /// Print an event each time a file is renamed onto TARGET
    Notify {
        /// Path of the symlink to watch (defaults to notify.target)
        target: Option<PathBuf>,

        /// Raw inotify read buffer size in bytes
        #[arg(long)]
        buffer_capacity: Option<usize>,
    },

    /// Serve /good, /redirect-to-good and /redirect-to-bad
    Serve {
        /// Address to listen on (defaults to server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Diff successive JSON documents read from stdin
    JsonDiff,

    /// Diff successive objects from a watch endpoint
    WatchDiff {
        /// Watch URL, e.g. http://localhost:8001/api/v1/watch/namespaces/default/services/web
        url: String,

        /// Exit when the server ends the stream instead of reconnecting
        #[arg(long)]
        no_reconnect: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_notify() {
        let cli = Cli::try_parse_from([
            "linkwatch",
            "notify",
            "/tmp/git/link",
            "--buffer-capacity",
            "131072",
        ])
        .unwrap();
        match cli.command {
            Commands::Notify {
                target,
                buffer_capacity,
            } => {
                assert_eq!(target, Some(PathBuf::from("/tmp/git/link")));
                assert_eq!(buffer_capacity, Some(131072));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["linkwatch", "serve", "-v", "--config", "alt.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert!(matches!(cli.command, Commands::Serve { bind: None }));
    }

    #[test]
    fn test_watch_diff_requires_url() {
        assert!(Cli::try_parse_from(["linkwatch", "watch-diff"]).is_err());
    }
}
