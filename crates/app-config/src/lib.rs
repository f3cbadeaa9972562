// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, MarketDataSettings, ScreenerSettings, ServerSettings, Settings};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `config/base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables (e.g., `APP__SERVER__PORT=9000`).
pub fn load_settings() -> Result<Settings> {
    load_settings_from("config")
}

/// Same layering as [`load_settings`], rooted at `config_dir`.
pub fn load_settings_from(config_dir: &str) -> Result<Settings> {
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        .add_source(File::with_name(&format!("{config_dir}/base")))
        .add_source(File::with_name(&format!("{config_dir}/{environment}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[app]
environment = "test"
log_level = "debug"

[server]
host = "127.0.0.1"
port = 8000

[market_data]
chart_base_url = "http://localhost/chart"
fundamentals_base_url = "http://localhost/timeseries"
"#;

    #[test]
    fn fills_optional_settings_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("base.toml"), MINIMAL).unwrap();

        let settings = load_settings_from(dir.path().to_str().unwrap()).unwrap();

        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.app.log_level, "debug");
        assert_eq!(settings.market_data.stage2_range, "2y");
        assert_eq!(settings.market_data.volume_interval, "1wk");
        assert_eq!(settings.screener.scan_delay_ms, 2_000);
        assert_eq!(settings.screener.default_period, "6mo");
    }

    #[test]
    fn missing_base_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_settings_from(dir.path().to_str().unwrap()),
            Err(Error::LoadError(_))
        ));
    }
}
