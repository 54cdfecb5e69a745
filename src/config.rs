//! Worker configuration, loaded from environment variables with hard
//! defaults.

use std::str::FromStr;
use std::sync::OnceLock;

use tracing::warn;

/// Judge worker configuration.
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Memory ceiling for one sandbox in MiB (default: 256).
    pub sandbox_memory_mb: u64,
    /// CPU share granted to one sandbox (default: 1.0).
    pub sandbox_cpus: f64,
    /// Execution identity inside the sandbox (default: "nobody").
    pub sandbox_user: String,
    /// Hard timeout for one host compiler invocation in seconds (default: 10).
    pub compile_timeout_secs: u64,
    /// Maximum submissions judged concurrently (default: 4).
    pub max_concurrent: usize,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            sandbox_memory_mb: 256,
            sandbox_cpus: 1.0,
            sandbox_user: "nobody".to_string(),
            compile_timeout_secs: 10,
            max_concurrent: 4,
        }
    }
}

impl JudgeConfig {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sandbox_memory_mb: env_or("SEKA_SANDBOX_MEMORY_MB", defaults.sandbox_memory_mb),
            sandbox_cpus: env_or("SEKA_SANDBOX_CPUS", defaults.sandbox_cpus),
            sandbox_user: std::env::var("SEKA_SANDBOX_USER").unwrap_or(defaults.sandbox_user),
            compile_timeout_secs: env_or("SEKA_COMPILE_TIMEOUT_SECS", defaults.compile_timeout_secs),
            max_concurrent: env_or("SEKA_MAX_CONCURRENT", defaults.max_concurrent),
        }
    }
}

fn env_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("ignoring unparseable {key}={raw}");
            default
        }),
        Err(_) => default,
    }
}

static CONFIG: OnceLock<JudgeConfig> = OnceLock::new();

/// Install the worker configuration. Later calls are ignored.
pub fn init_config(config: JudgeConfig) -> &'static JudgeConfig {
    CONFIG.get_or_init(|| config)
}

/// Get the worker configuration, falling back to defaults if `init_config`
/// was never called.
pub fn get_config() -> &'static JudgeConfig {
    CONFIG.get_or_init(JudgeConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = JudgeConfig::default();
        assert_eq!(config.sandbox_memory_mb, 256);
        assert_eq!(config.sandbox_cpus, 1.0);
        assert_eq!(config.sandbox_user, "nobody");
        assert_eq!(config.compile_timeout_secs, 10);
        assert_eq!(config.max_concurrent, 4);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("SEKA_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or::<u64>("SEKA_TEST_GARBAGE", 7), 7);
        std::env::remove_var("SEKA_TEST_GARBAGE");
    }

    #[test]
    fn test_env_or_reads_value() {
        std::env::set_var("SEKA_TEST_VALUE", "512");
        assert_eq!(env_or::<u64>("SEKA_TEST_VALUE", 7), 512);
        std::env::remove_var("SEKA_TEST_VALUE");
    }
}
