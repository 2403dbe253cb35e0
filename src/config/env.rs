use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Bearer token for the admin API. When unset every admin request is
    /// refused.
    pub admin_token: Option<String>,
    pub groq: GroqConfig,
    pub limits: LimitsConfig,
    pub monitor: MonitorConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// AI-tool uses per IP inside one fixed window.
    pub max_uses_per_ip: u32,
    pub usage_window: Duration,
    /// Contact-endpoint sliding-window budget.
    pub contact_max_requests: usize,
    pub contact_window: Duration,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub retention: Duration,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub sweep_crons: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
