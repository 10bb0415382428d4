mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use cli::context::PortalOverrides;
use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();

    cli::logging::init(args.verbose, args.quiet);
    cli::context::init(
        args.config.as_deref(),
        PortalOverrides {
            url: args.portal.clone(),
            token: args.token.clone(),
        },
    );

    let result = match &args.command {
        Commands::Diff {
            selection,
            text,
            all_keys,
            comments,
            snapshot,
        } => cli::commands::diff::execute(
            selection,
            *text,
            *all_keys,
            *comments,
            snapshot.as_deref(),
        ),
        Commands::Snapshot { selection, out } => cli::commands::snapshot::execute(selection, out),
        Commands::Envs => cli::commands::envs::execute(),
        Commands::ServerConfig { action } => cli::commands::server_config::execute(action),
        Commands::Users { action } => cli::commands::users::execute(action),
        Commands::Namespace { action } => cli::commands::namespace::execute(action),
        Commands::Consumer { action } => cli::commands::consumer::execute(action),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
