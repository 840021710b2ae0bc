//! # Cache Module
//!
//! Short-lived caches used by the interactive surfaces of the bot.
//!
//! Autocomplete requests fire on every keystroke and Discord only waits a few
//! seconds for the answer, so search suggestions are cached per lower-cased
//! query for `AUTOCOMPLETE_TTL_SECS`. Expired entries are dropped lazily on
//! read and in bulk by the hourly maintenance task.

pub mod ttl_cache;

pub use ttl_cache::TtlCache;

/// Opción de autocompletado ya recortada a los límites de Discord
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionChoice {
    pub name: String,
    pub value: String,
}

/// Sugerencias cacheadas por consulta normalizada
pub type SuggestionCache = TtlCache<String, Vec<SuggestionChoice>>;
