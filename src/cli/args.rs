//! Command-line interface definitions.

use crate::config::CONFIG_FILE;
use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Pagewright static site builder CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Source directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Destination directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub dest: Option<PathBuf>,

    /// Config file path (default: site.toml)
    #[arg(short = 'C', long, global = true, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the site into the destination directory
    #[command(visible_alias = "b")]
    Build {
        /// Wipe the destination directory before building
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        clean: Option<bool>,
    },

    /// Build, then serve the destination directory and rebuild on change
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching for auto-rebuild
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// Print password digests for `site.users`
    #[command(visible_alias = "p")]
    Password {
        /// Passwords to hash
        #[arg(required = true, value_name = "PASSWORD")]
        passwords: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from(["pagewright", "build", "--clean", "false"]).unwrap();
        assert!(matches!(cli.command, Commands::Build { clean: Some(false) }));
        assert_eq!(cli.config, PathBuf::from("site.toml"));

        let cli = Cli::try_parse_from(["pagewright", "-s", "content", "b", "-c"]).unwrap();
        assert!(matches!(cli.command, Commands::Build { clean: Some(true) }));
        assert_eq!(cli.source, Some(PathBuf::from("content")));
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from([
            "pagewright", "serve", "-p", "9000", "--watch", "false", "-C", "other.toml",
        ])
        .unwrap();
        let Commands::Serve { interface, port, watch } = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(interface, None);
        assert_eq!(port, Some(9000));
        assert_eq!(watch, Some(false));
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }

    #[test]
    fn test_password_requires_argument() {
        assert!(Cli::try_parse_from(["pagewright", "password"]).is_err());
        let cli = Cli::try_parse_from(["pagewright", "password", "a", "b"]).unwrap();
        let Commands::Password { passwords } = cli.command else {
            panic!("expected password");
        };
        assert_eq!(passwords, ["a", "b"]);
    }
}
