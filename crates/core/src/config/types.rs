use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::dispatcher::DispatcherConfig;
use crate::progress::ProgressConfig;
use crate::translation::TextType;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub translation: TranslationConfig,
    pub job_service: JobServiceConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Server configuration (health, metrics and task endpoints)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    5000
}

/// Machine-translation endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    /// Base URL of the translation API (e.g., "http://mt:8080/api/translate")
    pub url: String,
    /// Per-request timeout in seconds (default: 120)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Text type sent with every request (default: document)
    #[serde(default)]
    pub text_type: TextType,
}

fn default_request_timeout() -> u64 {
    120
}

/// File translation service (job metadata and file storage) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobServiceConfig {
    /// Base URL of the file translation service
    pub url: String,
    /// Basic auth user
    #[serde(default)]
    pub username: Option<String>,
    /// Basic auth password
    #[serde(default)]
    pub password: Option<String>,
    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_job_service_timeout")]
    pub timeout_secs: u64,
}

fn default_job_service_timeout() -> u64 {
    60
}

/// Worker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// Directory for per-task source/result files
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
        }
    }
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("doctrans")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub translation: TranslationConfig,
    pub job_service: SanitizedJobServiceConfig,
    pub dispatcher: DispatcherConfig,
    pub progress: ProgressConfig,
    pub worker: WorkerConfig,
}

/// Sanitized job service config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJobServiceConfig {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            translation: config.translation.clone(),
            job_service: SanitizedJobServiceConfig {
                url: config.job_service.url.clone(),
                username: config.job_service.username.clone(),
                password_configured: config
                    .job_service
                    .password
                    .as_ref()
                    .is_some_and(|p| !p.is_empty()),
                timeout_secs: config.job_service.timeout_secs,
            },
            dispatcher: config.dispatcher.clone(),
            progress: config.progress.clone(),
            worker: config.worker.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[translation]
url = "http://mt.local/api"

[job_service]
url = "http://files.local/api"
"#;

    #[test]
    fn test_deserialize_minimal_uses_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.translation.request_timeout_secs, 120);
        assert_eq!(config.translation.text_type, TextType::Document);
        assert_eq!(config.dispatcher.concurrency, 1);
        assert_eq!(config.dispatcher.max_batch_characters, 500);
        assert_eq!(config.dispatcher.max_attempts, 5);
        assert_eq!(config.progress.min_interval_ms, 1000);
        assert!(config.job_service.username.is_none());
        assert!(config.worker.work_dir.ends_with("doctrans"));
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[translation]
url = "http://mt.local/api"
request_timeout_secs = 30
text_type = "plain"

[job_service]
url = "http://files.local/api"
username = "worker"
password = "secret"

[dispatcher]
concurrency = 4
max_batch_characters = 1000
max_attempts = 3
timeout_cooldown_per_worker_ms = 500
max_consecutive_failures = 20

[progress]
min_interval_ms = 250

[worker]
work_dir = "/var/lib/doctrans"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.translation.text_type, TextType::Plain);
        assert_eq!(config.dispatcher.concurrency, 4);
        assert_eq!(config.dispatcher.failure_ceiling(), 20);
        assert_eq!(config.progress.min_interval_ms, 250);
        assert_eq!(config.worker.work_dir, PathBuf::from("/var/lib/doctrans"));
    }

    #[test]
    fn test_deserialize_missing_job_service_fails() {
        let toml = r#"
[translation]
url = "http://mt.local/api"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_password() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.job_service.username = Some("worker".to_string());
        config.job_service.password = Some("secret".to_string());

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.job_service.password_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"username\":\"worker\""));
    }

    #[test]
    fn test_sanitized_config_without_password() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert!(!sanitized.job_service.password_configured);
        assert_eq!(sanitized.server.port, 5000);
    }
}
