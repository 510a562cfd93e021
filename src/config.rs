use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Teleport-request timings, loadable from a YAML file with `WAYGATE_*`
/// environment overrides on top.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TeleportConfig {
    /// How long a submitted request stays pending before it expires.
    pub request_expiry_secs: u64,
    /// Delay between acceptance and relocation.
    pub countdown_delay_secs: u64,
    /// Rate limit on the requester after an acceptance.
    pub cooldown_secs: u64,
    /// Cadence of the countdown's periodic task.
    pub tick_interval_ms: u64,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        TeleportConfig {
            request_expiry_secs: 30,
            countdown_delay_secs: 3,
            cooldown_secs: 60,
            tick_interval_ms: 1000,
        }
    }
}

impl TeleportConfig {
    /// Load from a YAML file; a missing file yields the defaults.
    /// Environment overrides apply either way.
    pub fn load(path: &Path) -> Result<Self, String> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|err| format!("read {} failed: {}", path.display(), err))?;
            Self::from_yaml(&raw)
                .map_err(|err| format!("parse {} failed: {}", path.display(), err))?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, String> {
        serde_yaml::from_str(raw).map_err(|err| err.to_string())
    }

    pub fn request_expiry(&self) -> Duration {
        Duration::from_secs(self.request_expiry_secs)
    }

    pub fn countdown_delay(&self) -> Duration {
        Duration::from_secs(self.countdown_delay_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn apply_env_overrides(&mut self) -> Result<(), String> {
        if let Some(value) = env_override("WAYGATE_EXPIRY_SECS")? {
            self.request_expiry_secs = value;
        }
        if let Some(value) = env_override("WAYGATE_DELAY_SECS")? {
            self.countdown_delay_secs = value;
        }
        if let Some(value) = env_override("WAYGATE_COOLDOWN_SECS")? {
            self.cooldown_secs = value;
        }
        if let Some(value) = env_override("WAYGATE_TICK_MS")? {
            self.tick_interval_ms = value;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), String> {
        if self.request_expiry_secs == 0 {
            return Err("request_expiry_secs must be positive".to_string());
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be positive".to_string());
        }
        Ok(())
    }
}

fn env_override(name: &str) -> Result<Option<u64>, String> {
    let value = match std::env::var(name) {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| format!("{} must be a whole number, got {:?}", name, trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_windows() {
        let config = TeleportConfig::default();
        assert_eq!(config.request_expiry(), Duration::from_secs(30));
        assert_eq!(config.countdown_delay(), Duration::from_secs(3));
        assert_eq!(config.cooldown(), Duration::from_secs(60));
        assert_eq!(config.tick_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn yaml_overrides_individual_fields() {
        let config = TeleportConfig::from_yaml("cooldown_secs: 120\ncountdown_delay_secs: 5\n")
            .unwrap();
        assert_eq!(config.cooldown_secs, 120);
        assert_eq!(config.countdown_delay_secs, 5);
        // Untouched fields keep their defaults.
        assert_eq!(config.request_expiry_secs, 30);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(TeleportConfig::from_yaml("cooldwn_secs: 120\n").is_err());
    }

    #[test]
    fn zero_expiry_fails_validation() {
        let config = TeleportConfig {
            request_expiry_secs: 0,
            ..TeleportConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_tick_interval_fails_validation() {
        let config = TeleportConfig {
            tick_interval_ms: 0,
            ..TeleportConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join(format!(
            "waygate-config-test-{}-does-not-exist.yml",
            std::process::id()
        ));
        let config = TeleportConfig::load(&path).unwrap();
        assert_eq!(config.request_expiry_secs, 30);
    }
}
