use std::{io::Write as _, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{CollectionController, Diagnostic, HttpUsersRemote};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::TryRecvError},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

use commands::{dispatch, parse_command, Command, USAGE};
use config::load_settings;
use render::render;

#[derive(Parser, Debug)]
struct Args {
    /// Users service root; `/users` is appended.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long, default_value = "console.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(&args.config, args.base_url)?;
    let remote = Arc::new(HttpUsersRemote::new(&settings.base_url)?);
    info!(base_url = %remote.base_url(), "starting users console");

    let mut controller = CollectionController::with_policy(remote, settings.policy);
    info!(policy = ?controller.policy(), "reconcile policy");
    let mut diagnostics = controller.subscribe_diagnostics();

    controller.initialize().await?;
    print_diagnostics(&mut diagnostics);
    println!("{}", render(&controller.snapshot()));
    println!("{USAGE}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{USAGE}"),
            Ok(command) => {
                if let Err(err) = dispatch(&mut controller, command).await {
                    println!("{err}");
                }
                print_diagnostics(&mut diagnostics);
                println!("{}", render(&controller.snapshot()));
            }
            Err(err) => println!("{err}\n{USAGE}"),
        }
    }

    controller.settle().await;
    print_diagnostics(&mut diagnostics);
    Ok(())
}

fn print_diagnostics(diagnostics: &mut broadcast::Receiver<Diagnostic>) {
    loop {
        match diagnostics.try_recv() {
            Ok(diagnostic) => println!("{diagnostic}"),
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "diagnostics dropped"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
