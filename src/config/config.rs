use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppCfg {
    #[serde(default)]
    pub http: HttpCfg,
    #[serde(default)]
    pub refresh: RefreshCfg,
    pub database: DbCfg,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpCfg {
    #[serde(rename = "userAgent", default = "default_ua")]
    pub user_agent: String,
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
    #[serde(rename = "acceptLanguage", default = "default_accept_language")]
    pub accept_language: String,
    #[serde(rename = "maxRedirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            user_agent: default_ua(),
            timeout: default_timeout(),
            accept_language: default_accept_language(),
            max_redirects: default_max_redirects(),
        }
    }
}
fn default_ua() -> String {
    "treadscout/0.1 (tire catalog price monitor)".into()
}
fn default_timeout() -> Duration {
    Duration::from_secs(15)
}
fn default_accept_language() -> String {
    "en-US,en;q=0.9".into()
}
fn default_max_redirects() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshCfg {
    /// Cadence of the scheduled batch run
    #[serde(with = "humantime_serde", default = "default_interval")]
    pub interval: Duration,
    #[serde(rename = "commandBuffer", default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl Default for RefreshCfg {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            command_buffer: default_command_buffer(),
        }
    }
}
fn default_interval() -> Duration {
    // Weekly cadence
    Duration::from_secs(7 * 24 * 60 * 60)
}
fn default_command_buffer() -> usize {
    16
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DbCfg {
    #[serde(default)]
    pub url: String,
}

impl AppCfg {
    pub fn load(path: &str) -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::with_name(path))
            .add_source(config::Environment::default().separator("__"))
            .build()
            .context("building config")?;

        let app: AppCfg = cfg.try_deserialize().context("deserializing config")?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.database.url.is_empty(), "database.url missing");
        anyhow::ensure!(
            !self.http.user_agent.is_empty(),
            "http.userAgent must not be empty"
        );
        anyhow::ensure!(
            self.refresh.interval >= Duration::from_secs(60),
            "refresh.interval must be at least 1 minute"
        );
        anyhow::ensure!(
            self.refresh.command_buffer > 0,
            "refresh.commandBuffer must be > 0"
        );
        Ok(())
    }
}
