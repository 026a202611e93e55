//! offerpipe - canonical telecom offer rows from rendered page text

use clap::Parser;

use offerpipe::cli::{Cli, Commands, ConfigCommands};
use offerpipe::error::Result;

mod commands;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            csv,
            operator,
            upsert,
        } => commands::cmd_run(&input, csv, operator, upsert),

        Commands::Preview {
            input,
            limit,
            operator,
        } => commands::cmd_preview(&input, limit, operator),

        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::cmd_config_show(),
            ConfigCommands::Init => commands::cmd_config_init(),
        },
    }
}
