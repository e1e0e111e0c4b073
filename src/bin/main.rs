use std::error::Error;

use clap::Parser;
use token_cache::commands::inspect::InspectCommand;
use token_cache::commands::retrieve::RetrieveTokenCommand;
use token_cache::credentials::EnvCredentialsProvider;
use token_cache::manager::http_impl::HttpTokenManager;
use token_cache::parameters::{Commands, create_manager_settings, select_slot};
use token_cache::store::file::FileStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Variable holding the log filter, e.g. `TOKEN_CACHE_LOG=debug`.
const LOG_ENV_VAR: &str = "TOKEN_CACHE_LOG";

#[derive(Parser, Debug)]
#[command(name = "token-cache-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli_command = Cli::parse();

    // stdout only carries the token
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match cli_command.command {
        Commands::RetrieveToken {
            slot_args,
            environment,
            endpoints,
            http_args,
            retries,
            output_token_format,
        } => {
            if let Ok(path) = dotenvy::dotenv() {
                debug!(path = %path.display(), "loaded environment file");
            }

            let settings =
                create_manager_settings(&slot_args, environment, &endpoints, &http_args)?;
            let manager =
                HttpTokenManager::try_from_settings(settings, EnvCredentialsProvider::new())?
                    .with_retries(retries);

            let output =
                RetrieveTokenCommand::new(manager).retrieve_token(output_token_format)?;
            println!("{output}");
            Ok(())
        }
        Commands::Inspect {
            slot_args,
            output_token_format,
        } => {
            let slot = select_slot(&slot_args)?;
            let output = InspectCommand::new(FileStore::new(slot_args.store_dir))
                .inspect(slot, output_token_format)?;
            println!("{output}");
            Ok(())
        }
    }
}
