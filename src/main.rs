mod cli;
mod commands;
mod config;
mod engine;
mod paths;
mod progress;
mod resource;
mod runner;
mod sudo;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands, WallpaperCommand};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Status { target } => commands::declarative::status(&ctx, target.as_deref()),
        Commands::Diff { target } => commands::declarative::diff(&ctx, target.as_deref()),
        Commands::Apply(args) => {
            commands::declarative::apply(&ctx, args.target.as_deref(), args.dry_run, args.yes)
        }
        Commands::Install(args) => commands::install::run(&ctx, args),
        Commands::Updates(args) => {
            let config = config::Config::load()?;
            commands::updates::run(&config.updates, args.force)
        }
        Commands::Wallpaper(cmd) => {
            let config = config::Config::load()?;
            match cmd {
                WallpaperCommand::Toggle => commands::wallpaper::toggle(&config.wallpaper),
                WallpaperCommand::Set { image } => {
                    commands::wallpaper::set(&config.wallpaper, &image)
                }
            }
        }
        Commands::Doctor => commands::doctor::run(&ctx),
        Commands::Config(cmd) => commands::config::run(&ctx, cmd),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "hyprsetup", &mut io::stdout());
            Ok(())
        }
    }
}
