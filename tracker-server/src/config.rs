//! Server configuration from environment variables.
//!
//! Required:
//! - `TRACKER_API_BASE_URL` - backend base URL
//! - `TRACKER_DEFAULT_LAT`, `TRACKER_DEFAULT_LNG` - initial map centre
//!
//! Optional:
//! - `TRACKER_POLL_INTERVAL_SECS` (default 10)
//! - `TRACKER_REQUEST_TIMEOUT_SECS` (default 8)
//! - `TRACKER_CATEGORIES` - comma-separated key categories (default "bus")
//! - `TRACKER_LISTEN_ADDR` (default 127.0.0.1:3000)
//! - `TRACKER_STATIC_DIR` (default "static")
//! - `TRACKER_MOCK_DATA` - snapshot file to serve instead of the live feed

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::Position;
use crate::feed::FeedConfig;
use crate::poller::PollerConfig;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_POLL_SECS: u64 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 8;
const DEFAULT_CATEGORIES: &str = "bus";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be used
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Backend base URL.
    pub api_base_url: String,
    /// Initial map centre.
    pub default_center: Position,
    /// Time between snapshot fetches.
    pub poll_interval: Duration,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// Key categories treated as vehicles.
    pub categories: Vec<String>,
    /// Address the web server binds to.
    pub listen_addr: SocketAddr,
    /// Directory of static assets.
    pub static_dir: PathBuf,
    /// Serve this snapshot file instead of polling the backend.
    pub mock_data: Option<PathBuf>,
}

impl TrackerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let lat: f64 = parse("TRACKER_DEFAULT_LAT", &require("TRACKER_DEFAULT_LAT")?)?;
        let lng: f64 = parse("TRACKER_DEFAULT_LNG", &require("TRACKER_DEFAULT_LNG")?)?;
        let default_center = Position::new(lat, lng).map_err(|e| ConfigError::Invalid {
            name: "TRACKER_DEFAULT_LAT/LNG",
            value: format!("{lat},{lng}"),
            reason: e.to_string(),
        })?;

        let poll_secs: u64 = match get("TRACKER_POLL_INTERVAL_SECS") {
            Some(v) => parse("TRACKER_POLL_INTERVAL_SECS", &v)?,
            None => DEFAULT_POLL_SECS,
        };
        if poll_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "TRACKER_POLL_INTERVAL_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let request_timeout_secs = match get("TRACKER_REQUEST_TIMEOUT_SECS") {
            Some(v) => parse("TRACKER_REQUEST_TIMEOUT_SECS", &v)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let categories: Vec<String> = get("TRACKER_CATEGORIES")
            .unwrap_or_else(|| DEFAULT_CATEGORIES.to_string())
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        if categories.is_empty() {
            return Err(ConfigError::Invalid {
                name: "TRACKER_CATEGORIES",
                value: lookup("TRACKER_CATEGORIES").unwrap_or_default(),
                reason: "no categories listed".to_string(),
            });
        }

        let listen_addr = parse(
            "TRACKER_LISTEN_ADDR",
            &get("TRACKER_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
        )?;

        Ok(Self {
            api_base_url: require("TRACKER_API_BASE_URL")?,
            default_center,
            poll_interval: Duration::from_secs(poll_secs),
            request_timeout_secs,
            categories,
            listen_addr,
            static_dir: get("TRACKER_STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
            mock_data: get("TRACKER_MOCK_DATA").map(PathBuf::from),
        })
    }

    /// Feed client settings.
    pub fn feed(&self) -> FeedConfig {
        FeedConfig::new(&self.api_base_url)
            .with_categories(self.categories.iter().cloned())
            .with_timeout(self.request_timeout_secs)
    }

    /// Poller settings.
    pub fn poller(&self) -> PollerConfig {
        PollerConfig::default().with_interval(self.poll_interval)
    }
}

fn parse<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(vars: &HashMap<String, String>) -> Result<TrackerConfig, ConfigError> {
        TrackerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    fn minimal() -> HashMap<String, String> {
        env(&[
            ("TRACKER_API_BASE_URL", "http://localhost:8000"),
            ("TRACKER_DEFAULT_LAT", "52.2297"),
            ("TRACKER_DEFAULT_LNG", "21.0122"),
        ])
    }

    #[test]
    fn defaults() {
        let config = load(&minimal()).unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.default_center, Position { lat: 52.2297, lng: 21.0122 });
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.request_timeout_secs, 8);
        assert_eq!(config.categories, vec!["bus"]);
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert!(config.mock_data.is_none());
    }

    #[test]
    fn overrides() {
        let mut vars = minimal();
        vars.extend(env(&[
            ("TRACKER_POLL_INTERVAL_SECS", "5"),
            ("TRACKER_CATEGORIES", "bus, tram ,"),
            ("TRACKER_LISTEN_ADDR", "0.0.0.0:8080"),
            ("TRACKER_MOCK_DATA", "data/mock_snapshot.json"),
        ]));

        let config = load(&vars).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.categories, vec!["bus", "tram"]);
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(
            config.mock_data,
            Some(PathBuf::from("data/mock_snapshot.json"))
        );

        assert_eq!(config.feed().categories, vec!["bus", "tram"]);
        assert_eq!(config.poller().interval, Duration::from_secs(5));
    }

    #[test]
    fn missing_center_is_fatal() {
        let mut vars = minimal();
        vars.remove("TRACKER_DEFAULT_LAT");
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Missing("TRACKER_DEFAULT_LAT")
        );

        let mut vars = minimal();
        vars.insert("TRACKER_DEFAULT_LNG".into(), "  ".into());
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Missing("TRACKER_DEFAULT_LNG")
        );
    }

    #[test]
    fn missing_base_url_is_fatal() {
        let mut vars = minimal();
        vars.remove("TRACKER_API_BASE_URL");
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Missing("TRACKER_API_BASE_URL")
        );
    }

    #[test]
    fn invalid_values() {
        let mut vars = minimal();
        vars.insert("TRACKER_DEFAULT_LAT".into(), "north".into());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid {
                name: "TRACKER_DEFAULT_LAT",
                ..
            })
        ));

        let mut vars = minimal();
        vars.insert("TRACKER_DEFAULT_LAT".into(), "120".into());
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { .. })));

        let mut vars = minimal();
        vars.insert("TRACKER_POLL_INTERVAL_SECS".into(), "0".into());
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { .. })));

        let mut vars = minimal();
        vars.insert("TRACKER_CATEGORIES".into(), " , ".into());
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            ConfigError::Missing("TRACKER_DEFAULT_LAT").to_string(),
            "missing required configuration: TRACKER_DEFAULT_LAT"
        );
    }
}
