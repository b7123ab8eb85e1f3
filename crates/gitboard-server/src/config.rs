use gitboard_core::Category;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub jobs: JobsConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if self.github.per_page == 0 || self.github.per_page > 100 {
            return Err("github.per_page must be between 1 and 100".into());
        }
        if self.github.cache_ttl_secs == 0 {
            return Err("github.cache_ttl_secs must be > 0".into());
        }
        if self.github.categories.is_empty() {
            return Err("github.categories must not be empty".into());
        }
        for category in &self.github.categories {
            Category::parse(&category.name)
                .map_err(|e| format!("github.categories: {e}"))?;
        }
        let mut names: Vec<&str> = self
            .github
            .categories
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.github.categories.len() {
            return Err("github.categories names must be unique".into());
        }
        if self.auth.access_secret.is_empty() {
            return Err("auth.access_secret must not be empty".into());
        }
        if self.jobs.enabled {
            croner::Cron::new(&self.jobs.cron)
                .parse()
                .map_err(|e| format!("jobs.cron is not a valid cron expression: {e}"))?;
            if self.jobs.check_interval_secs == 0 {
                return Err("jobs.check_interval_secs must be > 0".into());
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Enable Redis. When disabled (the default) the store is a process-local
    /// map, which is fine for single-instance deployments.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_redis_url")]
    pub url: String,

    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    10
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
        }
    }
}

/// GitHub search adapter settings, including the category list.
///
/// Categories are configuration rather than a hardcoded enum so the set can
/// change (or shrink to just `trending`) without a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Optional bearer credential for a higher rate limit.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Cache TTL: 25 hours, one hour longer than the daily refresh period so
    /// entries survive a single missed run.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    "gitboard".to_string()
}

fn default_per_page() -> u32 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    60 * 60 * 25
}

fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig {
            name: "trending".into(),
            query: CategoryQuery::RecentlyCreated { days: 7 },
        },
        CategoryConfig {
            name: "agent".into(),
            query: CategoryQuery::Topic {
                topic: "agent".into(),
            },
        },
        CategoryConfig {
            name: "ai".into(),
            query: CategoryQuery::Topic { topic: "ai".into() },
        },
    ]
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token: None,
            user_agent: default_user_agent(),
            per_page: default_per_page(),
            cache_ttl_secs: default_cache_ttl_secs(),
            categories: default_categories(),
        }
    }
}

/// One feed category and how its upstream query is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub query: CategoryQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryQuery {
    /// Repositories created within the last `days` days, by stars.
    RecentlyCreated { days: u32 },
    /// Repositories carrying a topic label, by stars.
    Topic { topic: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_access_secret")]
    pub access_secret: String,

    /// Falls back to `access_secret` when unset.
    #[serde(default)]
    pub refresh_secret: Option<String>,

    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,

    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: u64,

    /// `development` enables logging of issued verification codes in place
    /// of mail delivery.
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_access_secret() -> String {
    "access_secret_fallback".to_string()
}

fn default_access_ttl_secs() -> u64 {
    60 * 15
}

fn default_refresh_ttl_secs() -> u64 {
    60 * 60 * 24 * 7
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            access_secret: default_access_secret(),
            refresh_secret: None,
            access_ttl_secs: default_access_ttl_secs(),
            refresh_ttl_secs: default_refresh_ttl_secs(),
            environment: default_environment(),
        }
    }
}

impl AuthSettings {
    pub fn refresh_secret(&self) -> &str {
        self.refresh_secret.as_deref().unwrap_or(&self.access_secret)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "default_jobs_enabled")]
    pub enabled: bool,

    /// Daily refresh schedule; 07:00 UTC by default.
    #[serde(default = "default_jobs_cron")]
    pub cron: String,

    /// How often the scheduler checks whether the cron is due.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

fn default_jobs_enabled() -> bool {
    true
}

fn default_jobs_cron() -> String {
    "0 7 * * *".to_string()
}

fn default_check_interval_secs() -> u64 {
    60
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: default_jobs_enabled(),
            cron: default_jobs_cron(),
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                let default_path = PathBuf::from("gitboard.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., GITBOARD__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("GITBOARD")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
