//! Configuration loader: merges env vars, .env file, and config.toml.

use std::collections::HashSet;
use std::path::Path;

use common::config::ServerConfig;
use common::Error;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_port(raw: &str) -> Result<u16, Error> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| Error::Config("PORT must be an integer in 0..=65535".into()))
}

fn validate_config(config: &ServerConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.api_key.trim().is_empty() {
        issues.push("OPENWEATHER_API_KEY is required (set in .env or environment)".into());
    }

    if config.parks.is_empty() {
        issues.push("parks must contain at least one park".into());
    }
    let mut seen = HashSet::new();
    for park in &config.parks {
        if park.name.trim().is_empty() {
            issues.push("park names must not be empty".into());
        }
        if !seen.insert(park.name.as_str()) {
            issues.push(format!("duplicate park name: {}", park.name));
        }
        if !(-90.0..=90.0).contains(&park.lat) {
            issues.push(format!("{}: lat must be in [-90, 90]", park.name));
        }
        if !(-180.0..=180.0).contains(&park.lon) {
            issues.push(format!("{}: lon must be in [-180, 180]", park.name));
        }
    }

    if config.provider.endpoint.trim().is_empty() {
        issues.push("provider.endpoint must not be empty".into());
    }
    if config.provider.request_timeout_secs == 0 {
        issues.push("provider.request_timeout_secs must be > 0".into());
    }
    if config.timing.refresh_interval_secs == 0 {
        issues.push("timing.refresh_interval_secs must be > 0".into());
    }
    if config.timing.fetch_timeout_secs == 0 {
        issues.push("timing.fetch_timeout_secs must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

fn parse_toml(contents: &str) -> Result<ServerConfig, Error> {
    toml::from_str(contents).map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
}

/// Apply environment overrides. `var` returns the value of a variable if set.
fn apply_env_overrides<F>(config: &mut ServerConfig, var: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = var("OPENWEATHER_API_KEY")
        .or_else(|| var("API_KEY"))
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    if let Some(key) = api_key {
        config.api_key = key;
    }
    if let Some(port) = var("PORT") {
        config.port = parse_port(&port)?;
    }
    if let Some(raw) = var("REFRESH_INTERVAL_SECS") {
        config.timing.refresh_interval_secs = parse_positive_u64(&raw, "REFRESH_INTERVAL_SECS")?;
    }
    if let Some(raw) = var("FETCH_TIMEOUT_SECS") {
        config.timing.fetch_timeout_secs = parse_positive_u64(&raw, "FETCH_TIMEOUT_SECS")?;
    }
    if let Some(endpoint) = var("OPENWEATHER_ENDPOINT") {
        config.provider.endpoint = endpoint.trim().to_string();
    }
    Ok(())
}

/// Load service configuration from environment and optional config file.
pub fn load_config(path: &Path) -> Result<ServerConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = ServerConfig::default();

    // 3. Try loading the config file if it exists.
    if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        config = parse_toml(&contents)?;
    } else {
        tracing::debug!("No config file at {}; using defaults", path.display());
    }

    // 4. Override with environment variables (highest priority).
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::ParkConfig;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn valid_config() -> ServerConfig {
        ServerConfig {
            api_key: "key".into(),
            ..ServerConfig::default()
        }
    }

    fn config_error(result: Result<(), Error>) -> String {
        match result {
            Err(Error::Config(msg)) => msg,
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_validate_with_api_key() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let msg = config_error(validate_config(&ServerConfig::default()));
        assert!(msg.contains("OPENWEATHER_API_KEY"), "{}", msg);
    }

    #[test]
    fn test_validation_collects_every_issue() {
        let mut cfg = valid_config();
        cfg.parks = vec![
            ParkConfig::new("Twin", 35.0, -85.0),
            ParkConfig::new("Twin", 95.0, -185.0),
        ];
        cfg.timing.refresh_interval_secs = 0;

        let msg = config_error(validate_config(&cfg));
        assert!(msg.contains("duplicate park name: Twin"), "{}", msg);
        assert!(msg.contains("lat must be in [-90, 90]"), "{}", msg);
        assert!(msg.contains("lon must be in [-180, 180]"), "{}", msg);
        assert!(msg.contains("timing.refresh_interval_secs"), "{}", msg);
    }

    #[test]
    fn test_empty_park_list_is_rejected() {
        let mut cfg = valid_config();
        cfg.parks.clear();
        let msg = config_error(validate_config(&cfg));
        assert!(msg.contains("at least one park"), "{}", msg);
    }

    #[test]
    fn test_env_overrides() {
        let mut cfg = ServerConfig::default();
        apply_env_overrides(
            &mut cfg,
            env(&[
                ("API_KEY", " legacy-key "),
                ("PORT", "8080"),
                ("REFRESH_INTERVAL_SECS", "18000"),
                ("FETCH_TIMEOUT_SECS", "15"),
                ("OPENWEATHER_ENDPOINT", "https://api.openweathermap.org/data/2.5/onecall"),
            ]),
        )
        .unwrap();

        assert_eq!(cfg.api_key, "legacy-key");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.timing.refresh_interval_secs, 18_000);
        assert_eq!(cfg.timing.fetch_timeout_secs, 15);
        assert!(cfg.provider.endpoint.contains("2.5"));
    }

    #[test]
    fn test_primary_api_key_wins_over_alias() {
        let mut cfg = ServerConfig::default();
        apply_env_overrides(
            &mut cfg,
            env(&[("OPENWEATHER_API_KEY", "primary"), ("API_KEY", "legacy")]),
        )
        .unwrap();
        assert_eq!(cfg.api_key, "primary");
    }

    #[test]
    fn test_bad_env_values_are_errors() {
        let mut cfg = ServerConfig::default();
        assert!(apply_env_overrides(&mut cfg, env(&[("PORT", "http")])).is_err());
        assert!(apply_env_overrides(&mut cfg, env(&[("REFRESH_INTERVAL_SECS", "0")])).is_err());
        assert!(apply_env_overrides(&mut cfg, env(&[("FETCH_TIMEOUT_SECS", "-5")])).is_err());
    }

    #[test]
    fn test_parse_toml_file() {
        let cfg = parse_toml(
            r#"
            port = 4000

            [timing]
            refresh_interval_secs = 18000

            [[parks]]
            name = "Windrock Offroad Park"
            lat = 36.0455
            lon = -84.4057
            "#,
        )
        .unwrap();

        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.timing.refresh_interval_secs, 18_000);
        assert_eq!(cfg.timing.fetch_timeout_secs, 60);
        assert_eq!(cfg.parks.len(), 1);
        assert_eq!(cfg.parks[0].name, "Windrock Offroad Park");
    }

    #[test]
    fn test_parse_toml_rejects_garbage() {
        assert!(matches!(parse_toml("port = \"x\""), Err(Error::Config(_))));
    }
}
