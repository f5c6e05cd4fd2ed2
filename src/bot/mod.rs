//! Chat bot layer
//!
//! The router holds the command logic and talks to an abstract `ChatOutput`;
//! the telegram module plugs it into teloxide.

pub mod commands;
pub mod i18n;
pub mod lang_store;
pub mod router;
pub mod telegram;

pub use commands::Command;
pub use i18n::{Lang, Messages};
pub use lang_store::LanguageStore;
pub use router::{ChatOutput, CommandRouter};
