//! Plain-text rendering of the global emote set.

use std::fmt::Write;

use super::GlobalEmoteSet;
use crate::error::ApiError;
use crate::host::StateView;

/// Renders the emote list as lines of text.
#[derive(Debug, Clone)]
pub struct EmoteListView {
    /// Maximum emotes listed before the rest are summarized.
    pub limit: usize,
    /// Image width used to pick the file URL shown per emote.
    pub max_width: u32,
}

impl Default for EmoteListView {
    fn default() -> Self {
        Self {
            limit: 20,
            max_width: 64,
        }
    }
}

impl EmoteListView {
    fn list(&self, set: &GlobalEmoteSet) -> String {
        let mut out = format!("{} global emotes\n", set.len());
        for emote in set.emotes.iter().take(self.limit) {
            let host = &emote.data.host;
            match host.best_file(self.max_width, "webp") {
                Some(file) => {
                    let _ = writeln!(out, "  {:<24} {}", emote.name, host.file_url(file));
                }
                None => {
                    let _ = writeln!(out, "  {}", emote.name);
                }
            }
        }
        if set.len() > self.limit {
            let _ = writeln!(out, "  ... and {} more", set.len() - self.limit);
        }
        out
    }
}

impl StateView<GlobalEmoteSet, ApiError> for EmoteListView {
    type Output = String;

    fn empty(&self) -> String {
        "Sign in to load emotes.\n".to_string()
    }

    fn loading(&self, previous: Option<&GlobalEmoteSet>) -> String {
        match previous {
            Some(set) => format!("Refreshing...\n{}", self.list(set)),
            None => "Loading emotes...\n".to_string(),
        }
    }

    fn content(&self, set: &GlobalEmoteSet) -> String {
        self.list(set)
    }

    fn error(&self, error: &ApiError) -> String {
        let mut out = format!("Error: {}\n", error.user_message());
        if error.is_retryable() {
            let _ = writeln!(out, "Hint: {}", error.category().recovery_hint());
        }
        out
    }
}
