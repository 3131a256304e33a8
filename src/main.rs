//! Pagewright - a static site builder with cascading variables, page
//! trees and a watching dev server.

mod actor;
mod cli;
mod compiler;
mod config;
mod core;
mod logger;
mod page;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{SiteConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    // Digests need no site around them
    if let Commands::Password { passwords } = &cli.command {
        cli::password::print_digests(passwords);
        return Ok(());
    }

    let config = init_config(SiteConfig::load(cli)?);

    match &cli.command {
        Commands::Build { .. } => cli::build::build_site(config),
        Commands::Serve { .. } => cli::serve::serve_site(config),
        Commands::Password { .. } => Ok(()),
    }
}
