//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Config {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `TNP_API_URL`: backend base URL, default `http://localhost:5000/api`
    /// - `TNP_REQUEST_TIMEOUT_SECS`: default 30
    /// - `TNP_CONNECT_TIMEOUT_SECS`: default 10
    /// - `TNP_DATA_DIR`: where the local store lives, default the XDG data dir
    pub fn from_env() -> Self {
        let api_url = std::env::var("TNP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let data_dir = std::env::var("TNP_DATA_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Self {
            api_url: normalize_base_url(&api_url),
            request_timeout: Duration::from_secs(env_parse_u64(
                "TNP_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            connect_timeout: Duration::from_secs(env_parse_u64(
                "TNP_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            data_dir,
        }
    }

    /// Replace the base URL, e.g. from a `--api-url` flag.
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = normalize_base_url(url);
        self
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("tnp.db")
    }
}

fn default_data_dir() -> PathBuf {
    // Use XDG data directory or fallback
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "tnp") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        PathBuf::from(".")
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Safety
    /// Env tests touch process-global state; each one clears what it sets.
    unsafe fn clear_env() {
        unsafe {
            std::env::remove_var("TNP_API_URL");
            std::env::remove_var("TNP_REQUEST_TIMEOUT_SECS");
            std::env::remove_var("TNP_CONNECT_TIMEOUT_SECS");
            std::env::remove_var("TNP_DATA_DIR");
        }
    }

    #[test]
    fn test_from_env_defaults_and_overrides() {
        unsafe { clear_env() };

        let cfg = Config::from_env();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.request_timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        assert_eq!(cfg.connect_timeout, Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

        unsafe {
            std::env::set_var("TNP_API_URL", "https://placements.example.edu/api/");
            std::env::set_var("TNP_REQUEST_TIMEOUT_SECS", "45");
            std::env::set_var("TNP_CONNECT_TIMEOUT_SECS", "not-a-number");
            std::env::set_var("TNP_DATA_DIR", "/tmp/tnp-test");
        }

        let cfg = Config::from_env();
        assert_eq!(cfg.api_url, "https://placements.example.edu/api");
        assert_eq!(cfg.request_timeout, Duration::from_secs(45));
        assert_eq!(cfg.connect_timeout, Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));
        assert_eq!(cfg.store_path(), PathBuf::from("/tmp/tnp-test/tnp.db"));

        unsafe { clear_env() };
    }

    #[test]
    fn test_with_api_url_trims_trailing_slash() {
        let cfg = Config {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(1),
            data_dir: PathBuf::from("."),
        }
        .with_api_url("http://10.0.0.5:8080/api//");
        assert_eq!(cfg.api_url, "http://10.0.0.5:8080/api");
    }
}
