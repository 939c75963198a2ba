//! `snappi` command line.

mod command;
mod demo;
mod room;
mod session;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sn_core::config::AppConfig;
use tracing::warn;

use crate::bootstrap::{wire_app, Backend};

pub use command::RoomCommand;

#[derive(Parser)]
#[command(name = "snappi")]
#[command(about = "Shared clipboard sessions and rooms", long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/snappi/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a single-owner text session; each stdin line replaces the text
    Session {
        /// Session id
        id: String,
    },
    /// Join a room (or create it); type `help` for commands
    Room {
        /// Room number
        id: String,
    },
    /// Two principals, one room, in memory
    Demo,
}

pub async fn run(command: Commands, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Session { id } => {
            let app = wire(config)?;
            session::run(&app, &id).await
        }
        Commands::Room { id } => {
            let app = wire(config)?;
            room::run(&app, &id).await
        }
        Commands::Demo => demo::run().await,
    }
}

fn wire(config: &AppConfig) -> anyhow::Result<sn_app::App> {
    let backend = Backend::from_config(config).context("invalid backend configuration")?;
    if backend == Backend::Memory {
        warn!("memory backend: nothing is shared outside this process");
    }
    Ok(wire_app(&backend)?)
}
