//! # Sources
//!
//! Resolución de consultas de texto o URLs a [`PlaybackItem`]s.
//!
//! El resto del bot sólo conoce el trait [`Resolver`]; la implementación por
//! defecto es [`YtDlpResolver`], que delega la búsqueda en `yt-dlp`.

pub mod ytdlp;

use async_trait::async_trait;

use crate::{audio::queue::PlaybackItem, error::ResolveError};

pub use ytdlp::YtDlpResolver;

/// Resultado de resolver una consulta
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    Single(PlaybackItem),
    Multiple(Vec<PlaybackItem>),
    NoMatch,
    Failure(String),
}

impl ResolveOutcome {
    /// Construye el resultado a partir de una lista de items
    pub fn from_items(mut items: Vec<PlaybackItem>) -> Self {
        match items.len() {
            0 => Self::NoMatch,
            1 => Self::Single(items.remove(0)),
            _ => Self::Multiple(items),
        }
    }

    /// Primer item reproducible, si existe
    pub fn first(self) -> Option<PlaybackItem> {
        match self {
            Self::Single(item) => Some(item),
            Self::Multiple(items) => items.into_iter().next(),
            Self::NoMatch | Self::Failure(_) => None,
        }
    }
}

/// Búsqueda asíncrona de items reproducibles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, query: &str) -> ResolveOutcome;
}

/// Búsqueda de varias sugerencias para el autocompletado
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Suggest: Send + Sync {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<PlaybackItem>, ResolveError>;
}

/// Verifica si la consulta es una URL directa
pub fn is_url(query: &str) -> bool {
    if !(query.starts_with("http://") || query.starts_with("https://")) {
        return false;
    }

    url::Url::parse(query)
        .map(|url| url.host_str().is_some())
        .unwrap_or(false)
}
