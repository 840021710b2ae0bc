//! # Active Switch
//!
//! Blue/green gate. Two instances of the bot share one Discord token; only the
//! one whose color matches the content of the active file handles events. The
//! file is flipped by the host (`echo green > /data/active`).

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::{BotColor, Config};

/// Color que se considera activo cuando el archivo no existe
const DEFAULT_ACTIVE: BotColor = BotColor::Blue;

#[derive(Debug, Clone)]
pub struct ActiveSwitch {
    color: BotColor,
    active_file: PathBuf,
    ready_file: PathBuf,
}

/// Respuesta de `GET /health` y `--health-check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub ready: bool,
    pub active: bool,
    pub color: BotColor,
}

impl ActiveSwitch {
    pub fn new(color: BotColor, active_file: impl Into<PathBuf>, ready_file: impl Into<PathBuf>) -> Self {
        Self {
            color,
            active_file: active_file.into(),
            ready_file: ready_file.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bot_color, &config.active_file, &config.ready_file)
    }

    pub fn color(&self) -> BotColor {
        self.color
    }

    /// Verifica si esta instancia es la activa
    pub fn is_active(&self) -> bool {
        let active = match std::fs::read_to_string(&self.active_file) {
            Ok(content) => content.trim().to_lowercase(),
            Err(_) => DEFAULT_ACTIVE.as_str().to_string(),
        };

        active == self.color.as_str()
    }

    /// Marca la instancia como lista escribiendo la hora actual
    pub fn mark_ready(&self) {
        let now = chrono::Utc::now().to_rfc3339();
        match std::fs::write(&self.ready_file, now) {
            Ok(()) => debug!("✅ Instancia {} marcada como lista", self.color),
            Err(e) => warn!("⚠️ No se pudo escribir {}: {}", self.ready_file.display(), e),
        }
    }

    pub fn is_ready(&self) -> bool {
        Path::new(&self.ready_file).exists()
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "ok",
            ready: self.is_ready(),
            active: self.is_active(),
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn switch(dir: &TempDir, color: BotColor) -> ActiveSwitch {
        ActiveSwitch::new(color, dir.path().join("active"), dir.path().join("ready"))
    }

    #[test]
    fn test_missing_file_means_blue() {
        let dir = TempDir::new().unwrap();

        assert!(switch(&dir, BotColor::Blue).is_active());
        assert!(!switch(&dir, BotColor::Green).is_active());
    }

    #[test]
    fn test_active_file_is_trimmed_and_case_insensitive() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("active"), "  GREEN\n").unwrap();

        assert!(switch(&dir, BotColor::Green).is_active());
        assert!(!switch(&dir, BotColor::Blue).is_active());
    }

    #[test]
    fn test_unknown_color_activates_nobody() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("active"), "red").unwrap();

        assert!(!switch(&dir, BotColor::Green).is_active());
        assert!(!switch(&dir, BotColor::Blue).is_active());
    }

    #[test]
    fn test_mark_ready() {
        let dir = TempDir::new().unwrap();
        let switch = switch(&dir, BotColor::Blue);
        assert!(!switch.is_ready());

        switch.mark_ready();

        assert!(switch.is_ready());
        let stamp = std::fs::read_to_string(dir.path().join("ready")).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_mark_ready_ignores_io_errors() {
        let dir = TempDir::new().unwrap();
        let switch = ActiveSwitch::new(
            BotColor::Blue,
            dir.path().join("active"),
            dir.path().join("no-existe").join("ready"),
        );

        switch.mark_ready();
        assert!(!switch.is_ready());
    }

    #[test]
    fn test_health_report_json() {
        let dir = TempDir::new().unwrap();
        let switch = switch(&dir, BotColor::Green);

        let report = switch.health();
        assert_eq!(
            report,
            HealthReport {
                status: "ok",
                ready: false,
                active: false,
                color: BotColor::Green,
            }
        );
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"status":"ok","ready":false,"active":false,"color":"green"}"#
        );
    }
}
