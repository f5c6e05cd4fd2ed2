//! Per-chat language preferences

use crate::bot::i18n::Lang;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Chat id to language map, kept for the life of the process
#[derive(Debug, Default)]
pub struct LanguageStore {
    default_lang: Lang,
    prefs: RwLock<HashMap<i64, Lang>>,
}

impl LanguageStore {
    pub fn new(default_lang: Lang) -> Self {
        Self {
            default_lang,
            prefs: RwLock::new(HashMap::new()),
        }
    }

    /// Language of a chat, or the default when it never chose one
    pub async fn get(&self, chat_id: i64) -> Lang {
        self.prefs
            .read()
            .await
            .get(&chat_id)
            .copied()
            .unwrap_or(self.default_lang)
    }

    pub async fn set(&self, chat_id: i64, lang: Lang) {
        self.prefs.write().await.insert(chat_id, lang);
    }
}
