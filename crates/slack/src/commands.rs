use serde::Deserialize;
use standup_core::ReportChannel;
use tracing::info;

pub const REPORT_HERE_COMMAND: &str = "report here";

/// Form fields Slack posts for a slash command. Unknown fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlashCommandPayload {
    pub command: String,
    pub text: String,
    pub channel_id: String,
    pub channel_name: String,
    pub user_id: String,
    pub team_id: String,
    pub response_url: String,
    pub trigger_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StandupCommand {
    ReportHere,
    Unknown { text: String },
}

pub fn parse_standup_command(text: &str) -> StandupCommand {
    if text == REPORT_HERE_COMMAND {
        StandupCommand::ReportHere
    } else {
        StandupCommand::Unknown { text: text.to_owned() }
    }
}

pub struct CommandRouter {
    report_channel: ReportChannel,
}

impl CommandRouter {
    pub fn new(report_channel: ReportChannel) -> Self {
        Self { report_channel }
    }

    /// Applies the command and returns the ephemeral reply text.
    pub async fn route(&self, payload: &SlashCommandPayload) -> String {
        match parse_standup_command(&payload.text) {
            StandupCommand::ReportHere => {
                let previous = self.report_channel.set(payload.channel_id.clone()).await;
                info!(
                    event_name = "standup.report_channel.updated",
                    channel_id = %payload.channel_id,
                    previous = previous.as_deref().unwrap_or("unset"),
                    user_id = %payload.user_id,
                    "report channel updated"
                );
                "Thanks! I'll ask to report to that channel".to_owned()
            }
            StandupCommand::Unknown { text } => {
                info!(
                    event_name = "standup.command.unknown",
                    text = %text,
                    user_id = %payload.user_id,
                    "unknown slash command text"
                );
                format!("Sorry, I don't know this command. Please use `{REPORT_HERE_COMMAND}` command")
            }
        }
    }
}
