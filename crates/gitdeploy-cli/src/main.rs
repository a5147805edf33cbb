//! gitdeploy CLI - keep server working trees in sync with their git remotes.

use clap::Parser;

mod commands;
mod logging;
mod output;

use commands::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    output::set_quiet(cli.quiet);
    logging::init(cli.quiet, cli.json_logs);

    let result = match cli.command {
        Commands::Update {
            targets,
            fail_fast,
            json,
        } => commands::update::run(&cli.config, &targets, fail_fast, json),
        Commands::List { json } => commands::list::run(&cli.config, json),
        Commands::Check => commands::check::run(&cli.config),
        Commands::Serve { listen } => commands::serve::run(&cli.config, listen),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
