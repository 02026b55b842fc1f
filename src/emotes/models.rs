use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// The global emote set, available in every channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalEmoteSet {
    #[serde(default)]
    pub emotes: Vec<Emote>,
}

impl GlobalEmoteSet {
    pub fn len(&self) -> usize {
        self.emotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emotes.is_empty()
    }

    /// Look up an emote by the name it is typed as in chat.
    pub fn find(&self, name: &str) -> Option<&Emote> {
        self.emotes.iter().find(|emote| emote.name == name)
    }
}

/// An emote as it appears in a set.
///
/// `name` is the alias used in the set and may differ from `data.name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emote {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub flags: i64,
    /// Milliseconds since the Unix epoch when the emote was added to the set.
    #[serde(default)]
    pub timestamp: i64,
    pub data: EmoteData,
}

impl Emote {
    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoteData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub flags: i64,
    #[serde(default)]
    pub lifecycle: i64,
    pub host: EmoteHost,
}

/// CDN location of an emote's image files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoteHost {
    /// Base URL, usually protocol-relative (`//cdn.7tv.app/emote/<id>`).
    pub url: String,
    #[serde(default)]
    pub files: Vec<EmoteFile>,
}

impl EmoteHost {
    /// Absolute URL of `file` on this host.
    pub fn file_url(&self, file: &EmoteFile) -> String {
        let base = self.url.trim_end_matches('/');
        if base.starts_with("//") {
            format!("https:{}/{}", base, file.name)
        } else {
            format!("{}/{}", base, file.name)
        }
    }

    /// Widest file in `format` that is no wider than `max_width`.
    ///
    /// Falls back to the narrowest file of that format when all of them are
    /// wider than `max_width`.
    pub fn best_file(&self, max_width: u32, format: &str) -> Option<&EmoteFile> {
        let candidates = self
            .files
            .iter()
            .filter(|file| file.format.eq_ignore_ascii_case(format));
        let fitting = candidates
            .clone()
            .filter(|file| file.width <= max_width)
            .max_by_key(|file| file.width);
        fitting.or_else(|| candidates.min_by_key(|file| file.width))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoteFile {
    pub name: String,
    #[serde(default)]
    pub static_name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub frame_count: u32,
    #[serde(default)]
    pub size: u64,
    pub format: String,
}

impl EmoteFile {
    pub fn is_animated(&self) -> bool {
        self.frame_count > 1
    }
}
