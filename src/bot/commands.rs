//! Chat commands understood by the bot

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Debug, Clone, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "greeting and short usage")]
    Start,
    #[command(description = "list commands")]
    Help,
    #[command(description = "check whether a site is reachable from Hungary")]
    Check(String),
    #[command(description = "take a screenshot of a page")]
    Shot(String),
    #[command(description = "alias of /shot")]
    Screenshot(String),
    #[command(description = "set reply language (hu|en)")]
    Lang(String),
}
