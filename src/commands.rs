use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, info};

use crate::config::CommandsConfig;
use crate::lookup::MediaLookup;
use crate::platform::{IncomingMessage, ReplySink};
use crate::reply::{format_reply, LookupOutcome, ProviderResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Music { query: String },
    List,
}

/// Match the text against the configured triggers. The music prefix wins
/// when both would match.
pub fn parse_command(text: &str, commands: &CommandsConfig) -> Option<Command> {
    if let Some(rest) = text.strip_prefix(commands.music_prefix.as_str()) {
        return Some(Command::Music {
            query: rest.trim().to_string(),
        });
    }
    if text.starts_with(commands.list_trigger.as_str()) {
        return Some(Command::List);
    }
    None
}

/// Routes chat commands to the lookup clients. Platform-agnostic: receives
/// an `IncomingMessage`, answers through a `ReplySink`.
pub struct Dispatcher {
    commands: CommandsConfig,
    video: Arc<dyn MediaLookup>,
    track: Arc<dyn MediaLookup>,
}

impl Dispatcher {
    pub fn new(
        commands: CommandsConfig,
        video: Arc<dyn MediaLookup>,
        track: Arc<dyn MediaLookup>,
    ) -> Self {
        Self {
            commands,
            video,
            track,
        }
    }

    /// Handle one inbound message. Messages from `bot_user_id` are ignored.
    pub async fn handle_message(
        &self,
        incoming: &IncomingMessage,
        bot_user_id: &str,
        sink: &dyn ReplySink,
    ) -> Result<()> {
        if incoming.user_id == bot_user_id {
            debug!("Ignoring own message in chat {}", incoming.chat_id);
            return Ok(());
        }

        match parse_command(&incoming.text, &self.commands) {
            Some(Command::Music { query }) => {
                info!(
                    "Request from {} ({}) on {}: {}",
                    incoming.user_name, incoming.user_id, incoming.platform, query
                );
                let reply = self.lookup(&query).await;
                sink.send_text(&incoming.chat_id, &reply).await
            }
            Some(Command::List) => {
                sink.send_text(&incoming.chat_id, &self.commands.list_reply)
                    .await
            }
            None => Ok(()),
        }
    }

    /// Query both providers in order and compose the reply text.
    pub async fn lookup(&self, query: &str) -> String {
        let video = query_provider(self.video.as_ref(), query).await;
        let track = query_provider(self.track.as_ref(), query).await;
        format_reply(&video, &track)
    }
}

async fn query_provider(lookup: &dyn MediaLookup, query: &str) -> ProviderResult {
    let provider = lookup.provider();
    let outcome = match lookup.search(query).await {
        Ok(result) => {
            info!("Response: [{}] {}", provider, result.as_text());
            LookupOutcome::from(result)
        }
        Err(e) => {
            error!("{} lookup failed: {:#}", provider, e);
            LookupOutcome::Unavailable
        }
    };
    ProviderResult { provider, outcome }
}
