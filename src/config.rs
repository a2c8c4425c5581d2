//! Portal configuration loaded from environment variables.
//!
//! Every setting has a default so the portal starts with zero configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Which account service backs the login and registration pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Any non-empty credentials log in as the demo user; nothing is stored
    Demo,
    /// Accounts are persisted and passwords verified
    Accounts,
}

impl AuthMode {
    pub fn from_strng(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "demo" => Some(AuthMode::Demo),
            "accounts" => Some(AuthMode::Accounts),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Env: `PORTAL_HTTP_ADDR`
    /// Default: `127.0.0.1:3000`
    pub http_addr: SocketAddr,

    /// Directory served under `/static`.
    /// Env: `PORTAL_STATIC_DIR`
    /// Default: `static`
    pub static_dir: PathBuf,

    /// JSON file backing the session store. In-memory when unset.
    /// Env: `PORTAL_STORE_PATH`
    pub store_path: Option<PathBuf>,

    /// Env: `PORTAL_AUTH_MODE` (`demo` or `accounts`)
    /// Default: `demo`
    pub auth_mode: AuthMode,

    /// Accounts file, only used in `accounts` mode.
    /// Env: `PORTAL_ACCOUNTS_PATH`
    /// Default: `database/accounts.json`
    pub accounts_path: PathBuf,

    /// Artificial latency before login and registration complete.
    /// Env: `PORTAL_AUTH_DELAY_MS`
    /// Default: 1000 ms
    pub auth_delay: Duration,

    /// Artificial latency before a submission is written.
    /// Env: `PORTAL_SUBMIT_DELAY_MS`
    /// Default: 2000 ms
    pub submit_delay: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            http_addr: ([127, 0, 0, 1], 3000).into(),
            static_dir: PathBuf::from("static"),
            store_path: None,
            auth_mode: AuthMode::Demo,
            accounts_path: PathBuf::from("database/accounts.json"),
            auth_delay: Duration::from_millis(1000),
            submit_delay: Duration::from_millis(2000),
        }
    }
}

impl PortalConfig {
    /// Load configuration from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("PORTAL_HTTP_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(parsed) => config.http_addr = parsed,
                Err(_) => log::warn!("Invalid PORTAL_HTTP_ADDR {:?}, using default", addr),
            }
        }

        if let Some(dir) = lookup("PORTAL_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }

        if let Some(path) = lookup("PORTAL_STORE_PATH") {
            if !path.trim().is_empty() {
                config.store_path = Some(PathBuf::from(path));
            }
        }

        if let Some(mode) = lookup("PORTAL_AUTH_MODE") {
            match AuthMode::from_strng(&mode) {
                Some(parsed) => config.auth_mode = parsed,
                None => log::warn!("Invalid PORTAL_AUTH_MODE {:?}, using demo", mode),
            }
        }

        if let Some(path) = lookup("PORTAL_ACCOUNTS_PATH") {
            config.accounts_path = PathBuf::from(path);
        }

        if let Some(delay) = parse_millis(&lookup, "PORTAL_AUTH_DELAY_MS") {
            config.auth_delay = delay;
        }

        if let Some(delay) = parse_millis(&lookup, "PORTAL_SUBMIT_DELAY_MS") {
            config.submit_delay = delay;
        }

        config
    }

    /// Defaults with the simulated latency switched off
    pub fn without_delays() -> Self {
        Self {
            auth_delay: Duration::ZERO,
            submit_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

fn parse_millis<F>(lookup: &F, name: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            log::warn!("Invalid {} {:?}, using default", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = PortalConfig::default();
        assert_eq!(config.http_addr, ([127, 0, 0, 1], 3000).into());
        assert_eq!(config.auth_mode, AuthMode::Demo);
        assert!(config.store_path.is_none());
        assert_eq!(config.submit_delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = PortalConfig::from_lookup(lookup_from(&[
            ("PORTAL_HTTP_ADDR", "0.0.0.0:8080"),
            ("PORTAL_AUTH_MODE", "Accounts"),
            ("PORTAL_STORE_PATH", "database/sessions.json"),
            ("PORTAL_SUBMIT_DELAY_MS", "0"),
        ]));
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.auth_mode, AuthMode::Accounts);
        assert_eq!(config.store_path, Some(PathBuf::from("database/sessions.json")));
        assert_eq!(config.submit_delay, Duration::ZERO);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = PortalConfig::from_lookup(lookup_from(&[
            ("PORTAL_HTTP_ADDR", "not-an-address"),
            ("PORTAL_AUTH_MODE", "ldap"),
            ("PORTAL_AUTH_DELAY_MS", "soon"),
        ]));
        assert_eq!(config.http_addr, ([127, 0, 0, 1], 3000).into());
        assert_eq!(config.auth_mode, AuthMode::Demo);
        assert_eq!(config.auth_delay, Duration::from_millis(1000));
    }
}
