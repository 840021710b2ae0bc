use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{is_url, ResolveOutcome, Resolver, Suggest};
use crate::{audio::queue::PlaybackItem, error::ResolveError};

// url, título y autor separados por tabulador (los títulos pueden llevar '|')
const PRINT_TEMPLATE: &str = "%(webpage_url,url)s\t%(title)s\t%(uploader,channel)s";

/// Cliente que resuelve búsquedas y URLs usando yt-dlp
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    binary: String,
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpResolver {
    pub fn new() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
        }
    }

    /// Busca hasta `limit` resultados para una consulta de texto
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<PlaybackItem>, ResolveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }

        let identifier = format!("ytsearch{}:{}", limit.max(1), query);
        info!("🔍 Buscando con yt-dlp: {}", query);
        self.run(&identifier).await
    }

    /// Extrae los items de una URL (video o playlist)
    pub async fn extract(&self, url: &str) -> Result<Vec<PlaybackItem>, ResolveError> {
        info!("🔗 Extrayendo URL con yt-dlp: {}", url);
        self.run(url).await
    }

    async fn run(&self, target: &str) -> Result<Vec<PlaybackItem>, ResolveError> {
        let output = tokio::process::Command::new(&self.binary)
            .args([
                "--print",
                PRINT_TEMPLATE,
                "--flat-playlist",
                "--skip-download",
                "--quiet",
                "--no-warnings",
                "--socket-timeout",
                "15",
                "--retries",
                "2",
            ])
            .arg(target)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("❌ yt-dlp falló para {}: {}", target, stderr.trim());
            return Err(ResolveError::Process(stderr.trim().to_string()));
        }

        let items = parse_listing(&String::from_utf8_lossy(&output.stdout));
        debug!("📋 {} resultados para {}", items.len(), target);
        Ok(items)
    }
}

#[async_trait]
impl Resolver for YtDlpResolver {
    async fn resolve(&self, query: &str) -> ResolveOutcome {
        let result = if is_url(query) {
            self.extract(query).await
        } else {
            self.search(query, 1).await
        };

        match result {
            Ok(items) => ResolveOutcome::from_items(items),
            Err(ResolveError::EmptyQuery) => ResolveOutcome::NoMatch,
            Err(e) => ResolveOutcome::Failure(e.to_string()),
        }
    }
}

#[async_trait]
impl Suggest for YtDlpResolver {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<PlaybackItem>, ResolveError> {
        self.search(query, limit).await
    }
}

/// Convierte la salida de `--print` en items, ignorando líneas incompletas
pub fn parse_listing(stdout: &str) -> Vec<PlaybackItem> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split('\t');
            let locator = parts.next()?.trim();
            let title = parts.next()?.trim();
            let author = parts.next().map(str::trim).unwrap_or("NA");

            if locator.is_empty() || locator == "NA" {
                warn!("⚠️ Línea sin URL: {}", line);
                return None;
            }

            let author = if author == "NA" { "Desconocido" } else { author };
            Some(PlaybackItem::new(title, author, locator))
        })
        .collect()
}
