mod brkts;
mod divs;
mod pots;
mod stages;
mod tmnts;
mod utils;

use std::io;

use bowling_tournament_api::Client;
use clap::{Parser, Subcommand};
use thiserror::Error;

#[derive(Debug, Parser)]
#[clap(version, about)]
pub struct Args {
    #[clap(short = 'h', long)]
    uri: String,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Tmnts {
        #[clap(subcommand)]
        command: tmnts::Command,
    },
    Stages {
        #[clap(subcommand)]
        command: stages::Command,
    },
    Divs {
        #[clap(subcommand)]
        command: divs::Command,
    },
    Pots {
        #[clap(subcommand)]
        command: pots::Command,
    },
    Brkts {
        #[clap(subcommand)]
        command: brkts::Command,
    },
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let args = Args::parse();

    log::debug!("URI: {}", args.uri);

    let client = Client::new(args.uri);

    let res = match args.command {
        Command::Tmnts { command } => command.run(&client).await,
        Command::Stages { command } => command.run(&client).await,
        Command::Divs { command } => command.run(&client).await,
        Command::Pots { command } => command.run(&client).await,
        Command::Brkts { command } => command.run(&client).await,
    };

    if let Err(err) = res {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] bowling_tournament_api::Error),
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
