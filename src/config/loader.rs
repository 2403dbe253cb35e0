use std::{env, time::Duration};

use crate::{limiter, monitor, security::request_rate};

use super::env::{
    AppConfig, ConfigError, DirectoryConfig, GroqConfig, LimitsConfig, LoggingConfig,
    MonitorConfig, SchedulerConfig, ServerConfig,
};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let server = ServerConfig {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: match env::var("PORT") {
                Ok(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid("PORT"))?,
                Err(_) => 8080,
            },
        };

        let admin_token = env::var("ADMIN_TOKEN").ok().filter(|v| !v.is_empty());

        let groq = GroqConfig {
            api_key: env::var("GROQ_API_KEY").ok().filter(|v| !v.is_empty()),
            model: env::var("GROQ_MODEL").unwrap_or_else(|_| "openai/gpt-oss-120b".to_string()),
            enabled: env::var("REWRITER_ENABLED").map(|v| v != "false").unwrap_or(true),
        };

        let limits = LimitsConfig {
            max_uses_per_ip: parse_u64("MAX_USES_PER_IP")
                .map(|v| v as u32)
                .unwrap_or(limiter::DEFAULT_MAX_USES),
            usage_window: parse_u64("USAGE_WINDOW_HOURS")
                .map(|hours| Duration::from_secs(hours * 60 * 60))
                .unwrap_or(limiter::DEFAULT_WINDOW),
            contact_max_requests: parse_u64("CONTACT_MAX_REQUESTS")
                .map(|v| v as usize)
                .unwrap_or(request_rate::DEFAULT_MAX_REQUESTS),
            contact_window: parse_u64("CONTACT_WINDOW_SECS")
                .map(Duration::from_secs)
                .unwrap_or(request_rate::DEFAULT_WINDOW),
        };

        let monitor = MonitorConfig {
            retention: parse_u64("MONITOR_RETENTION_HOURS")
                .map(|hours| Duration::from_secs(hours * 60 * 60))
                .unwrap_or(monitor::DEFAULT_RETENTION),
        };

        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        let scheduler = SchedulerConfig {
            sweep_crons: env::var("SWEEP_CRONS")
                .map(|value| {
                    value
                        .split(';')
                        .map(|part| part.trim().to_string())
                        .filter(|part| !part.is_empty())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_else(|_| vec!["0 0 * * * *".to_string()]),
        };

        Ok(Self {
            server,
            admin_token,
            groq,
            limits,
            monitor,
            directories,
            logging,
            scheduler,
        })
    }
}

fn parse_u64(key: &str) -> Option<u64> {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
}
