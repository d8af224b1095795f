use std::sync::Arc;

use standup_core::config::{AppConfig, ConfigError, LoadOptions};
use standup_core::{InMemoryInterviewStore, MessageSender, ReportChannel, StandupDispatcher};
use standup_slack::client::{ClientBuildError, SlackWebClient};
use standup_slack::commands::CommandRouter;
use standup_slack::events::EventsApiHandler;
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub dispatcher: Arc<StandupDispatcher>,
    pub events: Arc<EventsApiHandler>,
    pub commands: Arc<CommandRouter>,
    pub report_channel: ReportChannel,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientBuildError),
}

impl Application {
    /// Wires the interview pipeline around an arbitrary sender.
    pub fn assemble(config: AppConfig, sender: Arc<dyn MessageSender>) -> Self {
        let report_channel = ReportChannel::new(config.standup.report_channel.clone());
        let dispatcher = Arc::new(StandupDispatcher::new(
            Arc::new(InMemoryInterviewStore::new()),
            sender,
            report_channel.clone(),
        ));

        Self {
            events: Arc::new(EventsApiHandler::new(dispatcher.clone())),
            commands: Arc::new(CommandRouter::new(report_channel.clone())),
            dispatcher,
            report_channel,
            config,
        }
    }
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let client = SlackWebClient::from_config(&config.slack)?;
    info!(
        event_name = "system.bootstrap.slack_client_ready",
        correlation_id = "bootstrap",
        api_url = client.post_message_url(),
        "slack web client initialized"
    );

    if config.standup.report_channel.is_none() {
        warn!(
            event_name = "system.bootstrap.report_channel_unset",
            correlation_id = "bootstrap",
            "no report channel configured; run `report here` in the target channel"
        );
    }

    Ok(Application::assemble(config, Arc::new(client)))
}
