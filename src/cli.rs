//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kiln static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name, relative to root (default: kiln.toml)
    #[arg(short = 'C', long, default_value = crate::config::DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Deletes the output directory if there is one and rebuilds the site
    Build {
        /// Output directory path (relative to project root)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minify the html content
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        minify: Option<bool>,
    },

    /// Serve the site, rendering every request fresh and reloading the
    /// browser on change
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,

        /// Port for the live reload WebSocket
        #[arg(long)]
        reload_port: Option<u16>,
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
    fn test_build_flags() {
        let cli = Cli::try_parse_from(["kiln", "build", "-m", "-o", "out"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("kiln.toml"));
        match cli.command {
            Commands::Build { output, minify } => {
                assert_eq!(output, Some(PathBuf::from("out")));
                assert_eq!(minify, Some(true));
            }
            Commands::Serve { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_minify_explicit_false() {
        let cli = Cli::try_parse_from(["kiln", "build", "--minify", "false"]).unwrap();
        assert!(matches!(cli.command, Commands::Build { minify: Some(false), .. }));
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "kiln", "-r", "site", "serve", "-i", "0.0.0.0", "-p", "3000", "--reload-port", "3001",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("site")));
        match cli.command {
            Commands::Serve {
                interface,
                port,
                reload_port,
            } => {
                assert_eq!(interface.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(3000));
                assert_eq!(reload_port, Some(3001));
            }
            Commands::Build { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_unknown_command_is_error() {
        assert!(Cli::try_parse_from(["kiln", "deploy"]).is_err());
        assert!(Cli::try_parse_from(["kiln"]).is_err());
    }
}
