// Copyright 2026 Ninbot Contributors
// SPDX-License-Identifier: Apache-2.0

//! Ninbot entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use ninbot::config::{resolve_config_path, Config};
use ninbot::driver::{Driver, Mode};
use ninbot::logging;
use ninbot::PromptSolver;
use ninbot_core::{Client, Page, PageKind, SessionConfig};

#[derive(Parser)]
#[command(
    name = "ninbot",
    about = "Training and battle bot for The Ninja-RPG",
    version
)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Configuration file name under conf/, or a path.
    /// Also reads from NINBOT_CONFIG env var.
    #[arg(long)]
    conf: Option<String>,

    /// What to do once logged in.
    #[arg(long, value_enum, default_value_t = Mode::Train)]
    mode: Mode,

    /// A logged in PHPSESSID to use instead of logging in.
    #[arg(long)]
    psid: Option<String>,

    /// Print the captcha URL instead of opening it in a browser.
    #[arg(long)]
    no_popup: bool,

    /// Directory the per-run log file is written to.
    #[arg(long, default_value = "log")]
    log_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Stop after this many trainings or battles.
    #[arg(long)]
    cycles: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and run the bot (default).
    Run(RunArgs),

    /// Parse a saved HTML page and print it as JSON.
    Inspect {
        /// Page kind (login-captcha, battle-entrance, battleground, ...).
        #[arg(long)]
        kind: PageKind,

        /// Saved HTML file.
        file: PathBuf,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   ninbot completions bash > ~/.local/share/bash-completion/completions/ninbot
    ///   ninbot completions zsh > ~/.zfunc/_ninbot
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run(cli.run)) {
        Commands::Run(args) => run(args).await?,

        Commands::Inspect { kind, file } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Can't read {}", file.display()))?;
            let page = Page::parse(kind, &html)?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }

        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ninbot", &mut std::io::stdout());
        }
    }

    Ok(())
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    logging::init(&args.log_dir, &args.log_level)?;

    let conf_path = resolve_config_path(args.conf.as_deref());
    let config = Config::load(&conf_path).with_context(|| {
        format!(
            "Could not load configuration file \"{}\"",
            conf_path.display()
        )
    })?;
    tracing::info!(
        "Ninbot is running with configuration \"{}\"",
        conf_path.display()
    );

    let client = Client::http(SessionConfig::default(), config.transport.timeout());
    let mut driver = Driver::new(client, config).with_cycles(args.cycles);

    match args.psid {
        Some(psid) => driver.resume(psid),
        None => driver.login(&mut PromptSolver::stdin(!args.no_popup)).await?,
    }

    driver.run(args.mode).await
}
