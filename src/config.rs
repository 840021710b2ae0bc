use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};

/// Límite de opciones que Discord acepta en un autocompletado
pub const MAX_AUTOCOMPLETE_CHOICES: usize = 25;

/// Color de despliegue blue/green
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BotColor {
    Blue,
    Green,
}

impl BotColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
        }
    }
}

impl fmt::Display for BotColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BotColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "blue" => Ok(Self::Blue),
            "green" => Ok(Self::Green),
            other => anyhow::bail!("BOT_COLOR debe ser 'blue' o 'green', se recibió: {}", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    // Discord
    pub discord_token: String,
    pub dev_guild_id: Option<u64>, // Para comandos de desarrollo

    // Despliegue blue/green
    pub bot_color: BotColor,
    pub active_file: PathBuf,
    pub ready_file: PathBuf,
    pub health_port: u16,

    // Paths
    pub sfx_dir: PathBuf,

    // Autocompletado
    pub autocomplete_ttl_secs: u64,
    pub autocomplete_limit: usize,

    // Cola
    pub queue_display_limit: usize,
    pub default_autoplay: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            // Discord
            discord_token: var("DISCORD_TOKEN")
                .or_else(|| var("TOKEN"))
                .or_else(|| var("token"))
                .context("Falta DISCORD_TOKEN en el entorno")?,
            dev_guild_id: var("DISCORD_DEV_GUILD_ID")
                .map(|s| s.trim().parse::<u64>())
                .transpose()
                .context("DISCORD_DEV_GUILD_ID inválido")?,

            // Despliegue
            bot_color: var("BOT_COLOR")
                .map(|s| s.parse::<BotColor>())
                .transpose()?
                .unwrap_or(defaults.bot_color),
            active_file: var("ACTIVE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.active_file),
            ready_file: var("READY_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.ready_file),
            health_port: var("HEALTH_PORT")
                .map(|s| s.trim().parse::<u16>())
                .transpose()
                .context("HEALTH_PORT inválido")?
                .unwrap_or(defaults.health_port),

            // Paths
            sfx_dir: var("SFX_DIR").map(PathBuf::from).unwrap_or(defaults.sfx_dir),

            // Autocompletado
            autocomplete_ttl_secs: var("AUTOCOMPLETE_TTL_SECS")
                .map(|s| s.trim().parse::<u64>())
                .transpose()
                .context("AUTOCOMPLETE_TTL_SECS inválido")?
                .unwrap_or(defaults.autocomplete_ttl_secs),
            autocomplete_limit: var("AUTOCOMPLETE_LIMIT")
                .map(|s| s.trim().parse::<usize>())
                .transpose()
                .context("AUTOCOMPLETE_LIMIT inválido")?
                .unwrap_or(defaults.autocomplete_limit),

            // Cola
            queue_display_limit: var("QUEUE_DISPLAY_LIMIT")
                .map(|s| s.trim().parse::<usize>())
                .transpose()
                .context("QUEUE_DISPLAY_LIMIT inválido")?
                .unwrap_or(defaults.queue_display_limit),
            default_autoplay: var("DEFAULT_AUTOPLAY")
                .map(|s| s.trim().to_lowercase().parse::<bool>())
                .transpose()
                .context("DEFAULT_AUTOPLAY inválido")?
                .unwrap_or(defaults.default_autoplay),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validates configuration values for correctness.
    ///
    /// # Validation Rules
    ///
    /// - The Discord token must not be empty
    /// - The autocomplete limit must be between 1 and 25 (Discord limit)
    /// - The queue display limit must be greater than 0
    pub fn validate(&self) -> Result<()> {
        if self.discord_token.trim().is_empty() {
            anyhow::bail!("Discord token must not be empty");
        }

        if self.autocomplete_limit == 0 || self.autocomplete_limit > MAX_AUTOCOMPLETE_CHOICES {
            anyhow::bail!(
                "Autocomplete limit must be between 1 and {}, got: {}",
                MAX_AUTOCOMPLETE_CHOICES,
                self.autocomplete_limit
            );
        }

        if self.queue_display_limit == 0 {
            anyhow::bail!("Queue display limit must be greater than 0");
        }

        Ok(())
    }

    /// Returns a summary of the current configuration for logging.
    ///
    /// Excludes the Discord token.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Discord: Guild {}\n  \
            Deploy: color={}, active={}, ready={}, health=:{}\n  \
            Autocomplete: {}s TTL, {} choices\n  \
            Queue: {} shown, Autoplay={}\n  \
            SFX: {}",
            self.dev_guild_id.map_or("global".to_string(), |id| id.to_string()),
            self.bot_color,
            self.active_file.display(),
            self.ready_file.display(),
            self.health_port,
            self.autocomplete_ttl_secs,
            self.autocomplete_limit,
            self.queue_display_limit,
            self.default_autoplay,
            self.sfx_dir.display(),
        )
    }
}

/// Default configuration values.
///
/// Used as fallbacks when environment variables are not provided.
impl Default for Config {
    fn default() -> Self {
        Self {
            // Discord (sin valor por defecto)
            discord_token: String::new(),
            dev_guild_id: None,

            bot_color: BotColor::Blue,
            active_file: "/data/active".into(),
            ready_file: "/tmp/ready".into(),
            health_port: 8080,

            sfx_dir: "resources".into(),

            autocomplete_ttl_secs: 30,
            autocomplete_limit: 15,

            queue_display_limit: 30,
            default_autoplay: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_token() {
        let config = Config::from_lookup(lookup(&[("DISCORD_TOKEN", "abc")])).unwrap();

        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.dev_guild_id, None);
        assert_eq!(config.bot_color, BotColor::Blue);
        assert_eq!(config.active_file, PathBuf::from("/data/active"));
        assert_eq!(config.ready_file, PathBuf::from("/tmp/ready"));
        assert_eq!(config.health_port, 8080);
        assert_eq!(config.sfx_dir, PathBuf::from("resources"));
        assert_eq!(config.autocomplete_ttl_secs, 30);
        assert_eq!(config.autocomplete_limit, 15);
        assert_eq!(config.queue_display_limit, 30);
        assert!(!config.default_autoplay);
    }

    #[test]
    fn test_token_fallbacks() {
        let config = Config::from_lookup(lookup(&[("TOKEN", "t1"), ("token", "t2")])).unwrap();
        assert_eq!(config.discord_token, "t1");

        let config = Config::from_lookup(lookup(&[("token", "t2")])).unwrap();
        assert_eq!(config.discord_token, "t2");

        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("DISCORD_TOKEN", "  ")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_DEV_GUILD_ID", "123456789"),
            ("BOT_COLOR", "Green"),
            ("ACTIVE_FILE", "/tmp/active"),
            ("HEALTH_PORT", "9090"),
            ("AUTOCOMPLETE_LIMIT", "25"),
            ("DEFAULT_AUTOPLAY", "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.dev_guild_id, Some(123456789));
        assert_eq!(config.bot_color, BotColor::Green);
        assert_eq!(config.active_file, PathBuf::from("/tmp/active"));
        assert_eq!(config.health_port, 9090);
        assert_eq!(config.autocomplete_limit, 25);
        assert!(config.default_autoplay);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_lookup(lookup(&[("DISCORD_TOKEN", "a"), ("BOT_COLOR", "red")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DISCORD_TOKEN", "a"), ("AUTOCOMPLETE_LIMIT", "26")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DISCORD_TOKEN", "a"), ("AUTOCOMPLETE_LIMIT", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DISCORD_TOKEN", "a"), ("DISCORD_DEV_GUILD_ID", "x")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DISCORD_TOKEN", "a"), ("HEALTH_PORT", "70000")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DISCORD_TOKEN", "a"), ("QUEUE_DISPLAY_LIMIT", "0")])).is_err());
    }

    #[test]
    fn test_summary_hides_token() {
        let config = Config {
            discord_token: "secreto".to_string(),
            ..Config::default()
        };

        let summary = config.summary();
        assert!(!summary.contains("secreto"));
        assert!(summary.contains("color=blue"));
    }
}
