//! Telegram transport: teloxide dispatcher feeding the command router

use crate::bot::commands::Command;
use crate::bot::router::{ChatOutput, CommandRouter};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Replies into one Telegram chat
pub struct TelegramOutput {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramOutput {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl ChatOutput for TelegramOutput {
    fn chat_id(&self) -> i64 {
        self.chat_id.0
    }

    async fn send_text(&self, text: String) -> Result<()> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }

    async fn send_photo(&self, png: Vec<u8>, caption: String) -> Result<()> {
        self.bot
            .send_photo(self.chat_id, InputFile::memory(png).file_name("screenshot.png"))
            .caption(caption)
            .await?;
        Ok(())
    }
}

/// Long-poll Telegram until Ctrl-C
pub async fn run(bot: Bot, router: Arc<CommandRouter>) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register command list: {}", e);
    }

    let handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(answer);

    info!("Bot starting...");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn answer(
    bot: Bot,
    msg: Message,
    cmd: Command,
    router: Arc<CommandRouter>,
) -> ResponseResult<()> {
    let out = TelegramOutput::new(bot.clone(), msg.chat.id);

    if let Err(e) = router.handle(cmd, &out).await {
        error!("Command failed in chat {}: {:#}", msg.chat.id.0, e);
        let text = router.messages(msg.chat.id.0).await.internal_error();
        if let Err(e) = bot.send_message(msg.chat.id, text).await {
            warn!("Failed to send error reply: {}", e);
        }
    }

    Ok(())
}
