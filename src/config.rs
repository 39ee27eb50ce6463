use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    /// Seconds between two persisted samples.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Upper bound for one tick (read + append); a slower tick is abandoned.
    #[serde(default = "default_tick_timeout_secs")]
    pub tick_timeout_secs: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            tick_timeout_secs: default_tick_timeout_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    300
}

fn default_tick_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HistoryConfig {
    /// Page size used when a caller gives no usable limit.
    #[serde(default = "default_history_limit")]
    pub default_limit: u32,
    /// Hard cap on rows returned by one history query.
    #[serde(default = "default_history_max_limit")]
    pub max_limit: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_history_limit(),
            max_limit: default_history_max_limit(),
        }
    }
}

fn default_history_limit() -> u32 {
    100
}

fn default_history_max_limit() -> u32 {
    1000
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.sampling.interval_secs > 0,
            "sampling.interval_secs must be > 0, got {}",
            self.sampling.interval_secs
        );
        anyhow::ensure!(
            self.sampling.tick_timeout_secs > 0,
            "sampling.tick_timeout_secs must be > 0, got {}",
            self.sampling.tick_timeout_secs
        );
        anyhow::ensure!(
            self.history.default_limit > 0,
            "history.default_limit must be > 0, got {}",
            self.history.default_limit
        );
        anyhow::ensure!(
            self.history.max_limit > 0,
            "history.max_limit must be > 0, got {}",
            self.history.max_limit
        );
        anyhow::ensure!(
            self.history.default_limit <= self.history.max_limit,
            "history.default_limit ({}) must not exceed history.max_limit ({})",
            self.history.default_limit,
            self.history.max_limit
        );
        Ok(())
    }
}
