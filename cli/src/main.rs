mod cli;
mod output;

use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use courier_api::{
    config::Config,
    domain::{
        request::{Authorization, CurrentRequest, QueryParams, RequestHeaders},
        saved::NewSavedRequest,
    },
    effects::{Coordinator, Intent},
    store::{Action, NotificationKind},
};
use log::info;

use crate::cli::{Cli, Commands, EnvCommands, HistoryCommands, SavedCommands, SendArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = Config {
        request_timeout: Duration::from_millis(cli.timeout_ms),
        // a one-shot process never lives long enough to hide anything
        notification_duration: Duration::ZERO,
        ..Config::with_database_path(&cli.db)
    };
    info!("using database {}", config.database_url);

    let coordinator = Coordinator::new(config)
        .await
        .context("could not start courier")?;
    run_intent(&coordinator, Intent::Initialize).await?;

    match cli.command {
        Commands::Send(args) => send(&coordinator, args).await,
        Commands::History(args) => match args.command {
            HistoryCommands::List => {
                output::print_history(&coordinator.state().await.history);
                Ok(())
            }
            HistoryCommands::Show { id } => {
                let state = coordinator.state().await;
                let item = state
                    .history
                    .get(&id)
                    .ok_or_else(|| anyhow!("no history item with id {id}"))?;
                println!("{}", serde_json::to_string_pretty(item)?);
                Ok(())
            }
            HistoryCommands::Remove { id } => {
                run_intent(&coordinator, Intent::RemoveHistoryItem(id)).await
            }
            HistoryCommands::Clear => run_intent(&coordinator, Intent::ClearHistory).await,
            HistoryCommands::Resend { id } => {
                if coordinator.state().await.history.get(&id).is_none() {
                    return Err(anyhow!("no history item with id {id}"));
                }
                coordinator.apply(Action::LoadHistoryItemToCurrent(id)).await;
                send_current(&coordinator).await
            }
        },
        Commands::Saved(args) => match args.command {
            SavedCommands::List => {
                output::print_saved(&coordinator.state().await.saved_requests);
                Ok(())
            }
            SavedCommands::Show { id } => {
                let state = coordinator.state().await;
                let saved = state
                    .saved_requests
                    .iter()
                    .find(|r| r.id == id)
                    .ok_or_else(|| anyhow!("no saved request with id {id}"))?;
                println!("{}", serde_json::to_string_pretty(saved)?);
                Ok(())
            }
            SavedCommands::Delete { id } => run_intent(&coordinator, Intent::DeleteSaved(id)).await,
            SavedCommands::Send { id } => {
                if !coordinator
                    .state()
                    .await
                    .saved_requests
                    .iter()
                    .any(|r| r.id == id)
                {
                    return Err(anyhow!("no saved request with id {id}"));
                }
                coordinator.apply(Action::LoadSavedRequestToCurrent(id)).await;
                send_current(&coordinator).await
            }
        },
        Commands::Env(args) => {
            match args.command {
                EnvCommands::List => {
                    output::print_environment(&coordinator.state().await.environment);
                    return Ok(());
                }
                EnvCommands::Set { key, value } => {
                    coordinator
                        .apply(Action::AddEnvironmentVariable { key, value })
                        .await
                }
                EnvCommands::Unset { key } => {
                    coordinator
                        .apply(Action::RemoveEnvironmentVariable(key))
                        .await
                }
                EnvCommands::Toggle { key } => {
                    coordinator
                        .apply(Action::ToggleEnvironmentVariable(key))
                        .await
                }
            }
            run_intent(&coordinator, Intent::SaveEnvironment).await
        }
        Commands::Export { path } => run_intent(&coordinator, Intent::Export(path)).await,
        Commands::Import { path } => run_intent(&coordinator, Intent::Import(path)).await,
    }
}

/// Runs one intent to completion and surfaces its notification.
async fn run_intent(coordinator: &Coordinator, intent: Intent) -> anyhow::Result<()> {
    coordinator.dispatch(intent).await?;
    let notification = coordinator.state().await.notification;
    if notification.is_visible {
        coordinator.apply(Action::HideNotification).await;
        if notification.kind == NotificationKind::Error {
            return Err(anyhow!(notification.message));
        }
        println!("{}", notification.message);
    }
    Ok(())
}

async fn send(coordinator: &Coordinator, args: SendArgs) -> anyhow::Result<()> {
    let authorization = if let Some(token) = args.bearer {
        Authorization::Bearer { token }
    } else if let Some((username, password)) = args.basic {
        Authorization::Basic { username, password }
    } else if let Some((key, value)) = args.api_key {
        Authorization::ApiKey {
            key,
            value,
            add_to: args.api_key_in,
        }
    } else {
        Authorization::None
    };

    coordinator.apply(Action::ResetCurrentRequest).await;
    coordinator.apply(Action::SetMethod(args.method)).await;
    coordinator.apply(Action::SetUrl(args.url)).await;
    coordinator
        .apply(Action::SetHeaders(args.headers.into_iter().collect::<RequestHeaders>()))
        .await;
    coordinator
        .apply(Action::SetParams(args.params.into_iter().collect::<QueryParams>()))
        .await;
    coordinator.apply(Action::SetAuthorization(authorization)).await;
    coordinator
        .apply(Action::SetBody(args.body.unwrap_or_default()))
        .await;

    if let Some(name) = args.save {
        let current = coordinator.state().await.current_request;
        run_intent(coordinator, Intent::Save(NewSavedRequest::from_current(name, &current))).await?;
    }
    send_current(coordinator).await
}

async fn send_current(coordinator: &Coordinator) -> anyhow::Result<()> {
    let current: CurrentRequest = coordinator.state().await.current_request;
    run_intent(coordinator, Intent::Send(current)).await?;

    let state = coordinator.state().await;
    if let Some(error) = state.error {
        return Err(anyhow!(error.message));
    }
    match state.response {
        Some(response) => {
            output::print_response(&response);
            Ok(())
        }
        None => Err(anyhow!("request produced no response")),
    }
}
