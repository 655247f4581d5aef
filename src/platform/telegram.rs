use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::{debug, error, info, warn};

use crate::commands::Dispatcher as CommandDispatcher;
use crate::platform::{IncomingMessage, ReplySink};

const SHUTDOWN_RETRY: Duration = Duration::from_millis(100);

/// Telegram user id of the bot account, used to drop its own messages.
#[derive(Debug, Clone)]
struct BotUserId(String);

/// Sends replies through the Bot API.
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ReplySink for TelegramSink {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
        let chat_id: i64 = chat_id
            .parse()
            .with_context(|| format!("Invalid Telegram chat id: {}", chat_id))?;
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .context("Failed to send Telegram message")?;
        Ok(())
    }
}

/// Run the Telegram bot platform until SIGINT or SIGTERM.
pub async fn run(commands: Arc<CommandDispatcher>, bot_token: &str) -> Result<()> {
    let bot = Bot::new(bot_token);

    let me = bot
        .get_me()
        .await
        .context("Failed to connect to Telegram")?;
    let bot_user_id = BotUserId(me.id.0.to_string());
    info!("Connected to Telegram as @{} ({})", me.username(), bot_user_id.0);

    info!("Starting Telegram platform...");

    let handler = Update::filter_message().endpoint(handle_message);

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![commands, bot_user_id])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .build();

    let shutdown = dispatcher.shutdown_token();
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutdown signal received, closing Telegram connection");
        shutdown_when_running(|| shutdown.shutdown()).await;
    });

    dispatcher.dispatch().await;
    info!("Telegram platform stopped");

    Ok(())
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    commands: Arc<CommandDispatcher>,
    bot_user_id: BotUserId,
) -> ResponseResult<()> {
    let user = match msg.from.as_ref() {
        Some(user) => user,
        None => return Ok(()),
    };

    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(()),
    };

    let incoming = IncomingMessage {
        platform: "telegram".to_string(),
        user_id: user.id.0.to_string(),
        chat_id: msg.chat.id.0.to_string(),
        user_name: user.first_name.clone(),
        text,
    };

    let sink = TelegramSink::new(bot);
    if let Err(e) = commands
        .handle_message(&incoming, &bot_user_id.0, &sink)
        .await
    {
        error!("Error handling message in chat {}: {:#}", incoming.chat_id, e);
    }

    Ok(())
}

/// Request shutdown, retrying while the dispatcher is still idle (a signal
/// can arrive before `dispatch` has started).
async fn shutdown_when_running<F, E>(
    mut try_shutdown: impl FnMut() -> std::result::Result<F, E>,
) where
    F: Future<Output = ()>,
{
    loop {
        match try_shutdown() {
            Ok(done) => {
                done.await;
                return;
            }
            Err(_) => {
                debug!("Telegram dispatcher not running yet, retrying shutdown");
                tokio::time::sleep(SHUTDOWN_RETRY).await;
            }
        }
    }
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
