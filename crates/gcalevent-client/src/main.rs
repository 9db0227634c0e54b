//! gcalevent CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use gcalevent_client::cli::{Cli, Command, ConfigAction};
use gcalevent_client::commands::{self, events, recordings};
use gcalevent_client::config::ClientConfig;
use gcalevent_client::error::{ClientError, ClientResult};
use gcalevent_core::{init_tracing, TracingConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };

    let tracing_config = if cli.debug || config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    let calendar = cli.calendar.as_deref();
    let max = config.defaults.max_results;
    let manager = || commands::manager(&config, cli.dry_run, cli.access_token.as_deref());

    let output = match &cli.command {
        Command::Config { action } => {
            return match action {
                ConfigAction::Dump => commands::config::dump(&config, &config_path),
                ConfigAction::Validate => commands::config::validate(&config),
                ConfigAction::Path => commands::config::path(&config_path),
            };
        }
        // Previews never leave the process.
        Command::Preview(args) => {
            events::preview(&commands::dry_run_manager(&config), args, calendar)?
        }
        Command::Create(args) => events::create(&manager()?, args, calendar).await?,
        Command::Get { event_id, open } => {
            events::get(&manager()?, calendar, event_id, *open).await?
        }
        Command::Update {
            event_id,
            event,
            clear,
        } => events::update(&manager()?, calendar, event_id, event, clear).await?,
        Command::Delete { event_id, notify } => {
            events::delete(&manager()?, calendar, event_id, *notify).await?
        }
        Command::List { max: limit, days } => {
            events::list(&manager()?, calendar, limit.unwrap_or(max), *days).await?
        }
        Command::Search { query, max: limit } => {
            events::search(&manager()?, calendar, query, limit.unwrap_or(max)).await?
        }
        Command::Between {
            start_date,
            end_date,
            max: limit,
        } => {
            events::between(
                &manager()?,
                calendar,
                *start_date,
                *end_date,
                limit.unwrap_or(max),
            )
            .await?
        }
        Command::Calendars => events::calendars(&manager()?).await?,
        Command::Recordings {
            event_id,
            folder,
            mime_type,
        } => {
            let query = config
                .recordings
                .to_query(folder.as_deref(), mime_type.as_deref());
            recordings::find(&manager()?, calendar, event_id, &query).await?
        }
    };

    print!("{}", output);
    Ok(())
}
