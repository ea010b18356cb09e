//! Game configuration.
//!
//! Loaded from the bundled `game_config.json`, then overridden per page load
//! from the query string (`?catalog=…&sound=off&log=debug&timeout=5000`).

use serde::Deserialize;

use crate::error::ConfigError;

pub const BUILTIN_GAME_CONFIG: &str = include_str!("data/game_config.json");

/// Query-string keys understood by [`GameConfig::with_overrides`].
pub const OVERRIDE_KEYS: &[&str] = &["catalog", "sound", "log", "timeout"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Remote upgrade catalog (JSON array of `{id, cost, increase}`).
    pub catalog_url: String,
    pub fetch_timeout_ms: u32,
    /// Passive generation is applied once per interval.
    pub tick_interval_ms: u32,
    pub sound_enabled: bool,
    pub sound_dir: String,
    pub theme_file: String,
    pub log_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            catalog_url: "https://cookie-upgrade-api.vercel.app/api/upgrades".into(),
            fetch_timeout_ms: 8_000,
            tick_interval_ms: 1_000,
            sound_enabled: true,
            sound_dir: "./assets/sounds".into(),
            theme_file: "Concerning Hobbits.mp3".into(),
            log_level: "info".into(),
        }
    }
}

impl GameConfig {
    /// The bundled configuration. Falls back to [`Default`] if the bundled
    /// file is somehow broken.
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_GAME_CONFIG).unwrap_or_else(|err| {
            log::warn!("{err}; using default config");
            Self::default()
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `key=value` overrides. Unknown keys and unparsable values are
    /// logged and skipped.
    pub fn with_overrides<'a>(mut self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        for (key, value) in pairs {
            let value = value.trim();
            match key {
                "catalog" if !value.is_empty() => self.catalog_url = value.to_string(),
                "sound" => match value {
                    "on" | "1" | "true" => self.sound_enabled = true,
                    "off" | "0" | "false" => self.sound_enabled = false,
                    _ => log::warn!("ignoring sound={value:?}"),
                },
                "log" if parse_level(value).is_some() => self.log_level = value.to_string(),
                "timeout" => match value.parse::<u32>() {
                    Ok(ms) if ms > 0 => self.fetch_timeout_ms = ms,
                    _ => log::warn!("ignoring timeout={value:?}"),
                },
                _ => log::warn!("ignoring unknown override {key}={value:?}"),
            }
        }
        self
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        parse_level(&self.log_level).unwrap_or(log::LevelFilter::Info)
    }

    /// Path of the opening theme.
    pub fn theme_path(&self) -> String {
        format!("{}/{}", self.sound_dir, self.theme_file)
    }

    /// Path of the purchase cue for an upgrade display name.
    pub fn sound_path(&self, name: &str) -> String {
        format!("{}/{}.mp3", self.sound_dir, name)
    }
}

fn parse_level(s: &str) -> Option<log::LevelFilter> {
    match s.to_ascii_lowercase().as_str() {
        "off" => Some(log::LevelFilter::Off),
        "error" => Some(log::LevelFilter::Error),
        "warn" => Some(log::LevelFilter::Warn),
        "info" => Some(log::LevelFilter::Info),
        "debug" => Some(log::LevelFilter::Debug),
        "trace" => Some(log::LevelFilter::Trace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_matches_default() {
        assert_eq!(GameConfig::builtin(), GameConfig::default());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg = GameConfig::from_json_str(r#"{ "sound_enabled": false }"#).unwrap();
        assert!(!cfg.sound_enabled);
        assert_eq!(cfg.tick_interval_ms, 1_000);
        assert_eq!(cfg.theme_file, "Concerning Hobbits.mp3");
    }

    #[test]
    fn broken_json_is_an_error() {
        assert!(matches!(
            GameConfig::from_json_str("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn overrides_apply() {
        let cfg = GameConfig::default().with_overrides([
            ("catalog", "http://localhost:8080/upgrades.json"),
            ("sound", "off"),
            ("log", "debug"),
            ("timeout", "2500"),
        ]);
        assert_eq!(cfg.catalog_url, "http://localhost:8080/upgrades.json");
        assert!(!cfg.sound_enabled);
        assert_eq!(cfg.level_filter(), log::LevelFilter::Debug);
        assert_eq!(cfg.fetch_timeout_ms, 2500);
    }

    #[test]
    fn bad_overrides_are_skipped() {
        let cfg = GameConfig::default().with_overrides([
            ("catalog", ""),
            ("sound", "loud"),
            ("log", "chatty"),
            ("timeout", "0"),
            ("colour", "green"),
        ]);
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn sound_paths() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.theme_path(), "./assets/sounds/Concerning Hobbits.mp3");
        assert_eq!(cfg.sound_path("Pint of Ale"), "./assets/sounds/Pint of Ale.mp3");
    }
}
