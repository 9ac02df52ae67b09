// Configuration module for tagscope
// Reads from environment variables with sensible defaults

use crate::process::ExecMode;
use std::env;
use std::ffi::OsString;
use std::time::Duration;

/// Application configuration, captured once by the caller and passed down.
#[derive(Debug, Clone)]
pub struct Config {
    /// Query binary (TAGSCOPE_GLOBAL)
    pub global_program: String,

    /// Index build binary (TAGSCOPE_GTAGS)
    pub gtags_program: String,

    /// Per-invocation deadline in seconds, 0 disables (TAGSCOPE_QUERY_TIMEOUT_SECS)
    pub query_timeout_secs: u64,

    /// Deadline for `gtags` in seconds, 0 disables (TAGSCOPE_REBUILD_TIMEOUT_SECS)
    pub rebuild_timeout_secs: u64,

    /// How child processes are launched (TAGSCOPE_EXEC_MODE)
    pub exec_mode: ExecMode,

    /// Search path handed to every child (PATH)
    pub search_path: OsString,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global_program: "global".to_string(),
            gtags_program: "gtags".to_string(),
            query_timeout_secs: 30,
            rebuild_timeout_secs: 0,
            exec_mode: ExecMode::Direct,
            search_path: OsString::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Some(path) = env::var_os("PATH") {
            config.search_path = path;
        }

        if let Ok(val) = env::var("TAGSCOPE_GLOBAL") {
            if !val.trim().is_empty() {
                config.global_program = val;
            }
        }

        if let Ok(val) = env::var("TAGSCOPE_GTAGS") {
            if !val.trim().is_empty() {
                config.gtags_program = val;
            }
        }

        if let Ok(val) = env::var("TAGSCOPE_QUERY_TIMEOUT_SECS") {
            if let Ok(parsed) = val.trim().parse() {
                config.query_timeout_secs = parsed;
            } else {
                tracing::warn!(
                    "invalid TAGSCOPE_QUERY_TIMEOUT_SECS value: {}, using default: {}",
                    val,
                    config.query_timeout_secs
                );
            }
        }

        if let Ok(val) = env::var("TAGSCOPE_REBUILD_TIMEOUT_SECS") {
            if let Ok(parsed) = val.trim().parse() {
                config.rebuild_timeout_secs = parsed;
            } else {
                tracing::warn!(
                    "invalid TAGSCOPE_REBUILD_TIMEOUT_SECS value: {}, using default: {}",
                    val,
                    config.rebuild_timeout_secs
                );
            }
        }

        if let Ok(val) = env::var("TAGSCOPE_EXEC_MODE") {
            match val.parse() {
                Ok(mode) => config.exec_mode = mode,
                Err(err) => tracing::warn!("{err}, using default: direct"),
            }
        }

        config
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        secs_to_deadline(self.query_timeout_secs)
    }

    pub fn rebuild_timeout(&self) -> Option<Duration> {
        secs_to_deadline(self.rebuild_timeout_secs)
    }
}

fn secs_to_deadline(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.global_program, "global");
        assert_eq!(config.gtags_program, "gtags");
        assert_eq!(config.query_timeout_secs, 30);
        assert_eq!(config.rebuild_timeout_secs, 0);
        assert_eq!(config.exec_mode, ExecMode::Direct);
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let config = Config {
            query_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.query_timeout(), None);

        let config = Config::default();
        assert_eq!(config.query_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.rebuild_timeout(), None);
    }
}
