use anyhow::bail;
use log::LevelFilter;

use crate::default::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

#[derive(Debug, Clone)]
pub struct HttpServiceConfig {
    base_url: String,
    user_agent: String,
}
impl Default for HttpServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
impl HttpServiceConfig {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.trim_end_matches('/').to_string();
    }

    pub fn set_user_agent(&mut self, user_agent: &str) {
        self.user_agent = user_agent.to_string();
    }

    pub(crate) fn check_http_config(&self) -> anyhow::Result<()> {
        if self.base_url.is_empty() {
            bail!("base_url cannot be empty");
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!(
                "Invalid base_url {:?}, must start with http:// or https://",
                self.base_url
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    log_level: LevelFilter,
    metrics_enabled: bool,
    pub http: HttpServiceConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Info,
            metrics_enabled: true,
            http: Default::default(),
        }
    }
}
impl Config {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics_enabled
    }

    pub fn set_log_level(mut self, log_level: LevelFilter) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn set_metrics_enabled(mut self, metrics_enabled: bool) -> Self {
        self.metrics_enabled = metrics_enabled;
        self
    }

    pub fn set_base_url(mut self, base_url: &str) -> Self {
        self.http.set_base_url(base_url);
        self
    }
}
impl Config {
    pub(crate) fn check_set_config(&self) -> anyhow::Result<()> {
        self.http.check_http_config()?;
        log::set_max_level(self.log_level);
        Ok(())
    }

    /// Validate and apply process-level settings (log level).
    pub fn init(&self) -> anyhow::Result<()> {
        self.check_set_config()
    }
}
