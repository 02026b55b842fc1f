//! 7TV emote API: wire models, the client that fetches them, and a text view.

mod client;
mod models;
mod view;

pub use client::{EmoteClient, DEFAULT_API_URL};
pub use models::{Emote, EmoteData, EmoteFile, EmoteHost, GlobalEmoteSet};
pub use view::EmoteListView;
