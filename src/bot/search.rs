use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::{
    cache::{SuggestionCache, SuggestionChoice},
    config::MAX_AUTOCOMPLETE_CHOICES,
    sources::Suggest,
};

/// Largo máximo de nombre y valor de una opción en Discord
pub const MAX_CHOICE_LEN: usize = 100;

/// Consultas más cortas no se buscan
pub const MIN_QUERY_LEN: usize = 3;

// Discord descarta la interacción a los 3 segundos
const SEARCH_TIMEOUT: Duration = Duration::from_millis(2500);

/// Sugerencias para el autocompletado de `/play`
pub struct AutocompleteSearch {
    source: Arc<dyn Suggest>,
    cache: SuggestionCache,
    limit: usize,
}

impl AutocompleteSearch {
    pub fn new(source: Arc<dyn Suggest>, ttl: Duration, limit: usize) -> Self {
        Self {
            source,
            cache: SuggestionCache::new(ttl),
            limit: limit.clamp(1, MAX_AUTOCOMPLETE_CHOICES),
        }
    }

    pub fn cache(&self) -> &SuggestionCache {
        &self.cache
    }

    /// Opciones para lo que el usuario lleva escrito; nunca falla
    pub async fn choices(&self, typed: &str) -> Vec<SuggestionChoice> {
        let typed = typed.trim();
        if typed.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let key = typed.to_lowercase();
        if let Some(cached) = self.cache.get(&key) {
            debug!("🎯 Autocompletado desde caché: {}", key);
            return cached;
        }

        let items = match tokio::time::timeout(SEARCH_TIMEOUT, self.source.suggest(typed, self.limit)).await {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => {
                warn!("⚠️ Falló la búsqueda de autocompletado: {}", e);
                return Vec::new();
            }
            Err(_) => {
                warn!("⏱️ Búsqueda de autocompletado expiró: {}", typed);
                return Vec::new();
            }
        };

        let choices: Vec<SuggestionChoice> = items
            .iter()
            .take(MAX_AUTOCOMPLETE_CHOICES)
            .map(|item| SuggestionChoice {
                name: trim_to_max(&item.display_line(), MAX_CHOICE_LEN),
                value: trim_to_max(&item.source_locator, MAX_CHOICE_LEN),
            })
            .collect();

        self.cache.insert(key, choices.clone());
        choices
    }
}

/// Recorta a `max` caracteres terminando en "…"
pub fn trim_to_max(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut trimmed: String = text.chars().take(max.saturating_sub(1)).collect();
    trimmed.push('…');
    trimmed
}
