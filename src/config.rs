use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::{Cli, WatchArgs};
use crate::error::{Error, Result};
use crate::platform;
use crate::store;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_RECENCY_WINDOW: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: PathBuf,
    pub poll_interval: Duration,
    /// None disables the screenshot watcher.
    pub watch_dir: Option<PathBuf>,
    pub settle_delay: Duration,
    pub recency_window: Duration,
}

/// Contents of config.toml. Every key is optional; durations use humantime
/// syntax ("1s", "500ms").
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub store: Option<PathBuf>,
    pub poll_interval: Option<String>,
    pub watch: Option<bool>,
    pub watch_dir: Option<PathBuf>,
    pub settle_delay: Option<String>,
    pub recency_window: Option<String>,
}

impl FileConfig {
    /// ~/.config/clipstack/config.toml or platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "clipstack")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(FileConfig::default());
        }

        let raw = fs::read_to_string(path)?;
        Self::parse(&raw, path)
    }

    pub fn parse(raw: &str, path: &Path) -> Result<Self> {
        toml::from_str(raw).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub fn parse_duration(value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim()).map_err(|source| Error::Duration {
        value: value.to_string(),
        source,
    })
}

fn duration_or(value: Option<&str>, default: Duration) -> Result<Duration> {
    value.map_or(Ok(default), parse_duration)
}

impl Config {
    /// Resolve the config from the config file and global flags.
    /// Flags win over the file, the file wins over defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let path = cli.config.clone().or_else(FileConfig::default_path);
        let file = match path {
            Some(path) => FileConfig::load(&path)?,
            None => FileConfig::default(),
        };

        Config::from_file(file, cli.store.clone())
    }

    pub fn from_file(file: FileConfig, store_override: Option<PathBuf>) -> Result<Self> {
        let platform = platform::detect();

        let store_path = match store_override.or(file.store) {
            Some(path) => path,
            None => store::default_path()?,
        };

        let watch_dir = if file.watch.unwrap_or(true) {
            file.watch_dir.or_else(|| platform::screenshot_dir(platform))
        } else {
            None
        };

        let config = Config {
            store_path,
            poll_interval: duration_or(file.poll_interval.as_deref(), DEFAULT_POLL_INTERVAL)?,
            watch_dir,
            settle_delay: duration_or(file.settle_delay.as_deref(), DEFAULT_SETTLE_DELAY)?,
            recency_window: duration_or(file.recency_window.as_deref(), DEFAULT_RECENCY_WINDOW)?,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn apply_watch_args(&mut self, args: &WatchArgs) -> Result<()> {
        if let Some(interval) = &args.interval {
            self.poll_interval = parse_duration(interval)?;
        }

        if args.no_watch {
            self.watch_dir = None;
        } else if let Some(dir) = &args.watch_dir {
            self.watch_dir = Some(dir.clone());
        }

        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig("poll interval must be greater than zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<FileConfig> {
        FileConfig::parse(raw, Path::new("config.toml"))
    }

    fn resolve(raw: &str) -> Result<Config> {
        Config::from_file(parse(raw)?, Some(PathBuf::from("/tmp/history.json")))
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = resolve("").unwrap();
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.settle_delay, DEFAULT_SETTLE_DELAY);
        assert_eq!(config.recency_window, DEFAULT_RECENCY_WINDOW);
        assert_eq!(config.store_path, PathBuf::from("/tmp/history.json"));
    }

    #[test]
    fn durations_use_humantime() {
        let config = resolve(
            r#"
            poll_interval = "250ms"
            settle_delay = "1s"
            recency_window = "2m"
            "#,
        )
        .unwrap();

        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.settle_delay, Duration::from_secs(1));
        assert_eq!(config.recency_window, Duration::from_secs(120));
    }

    #[test]
    fn bad_duration_is_reported() {
        let err = resolve(r#"poll_interval = "soon""#).unwrap_err();
        assert!(matches!(err, Error::Duration { ref value, .. } if value == "soon"));
    }

    #[test]
    fn zero_interval_rejected() {
        assert!(matches!(resolve(r#"poll_interval = "0s""#), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(matches!(parse("colour = \"red\""), Err(Error::Config { .. })));
    }

    #[test]
    fn watch_can_be_disabled_in_file() {
        let config = resolve("watch = false\nwatch_dir = \"/shots\"").unwrap();
        assert_eq!(config.watch_dir, None);
    }

    #[test]
    fn flag_store_wins_over_file() {
        let file = parse(r#"store = "/from/file.json""#).unwrap();
        let config = Config::from_file(file, Some(PathBuf::from("/from/flag.json"))).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/from/flag.json"));

        let file = parse(r#"store = "/from/file.json""#).unwrap();
        let config = Config::from_file(file, None).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/from/file.json"));
    }

    #[test]
    fn watch_args_override() {
        let mut config = resolve(r#"watch_dir = "/shots""#).unwrap();
        assert_eq!(config.watch_dir, Some(PathBuf::from("/shots")));

        config
            .apply_watch_args(&WatchArgs {
                interval: Some("2s".into()),
                watch_dir: Some(PathBuf::from("/other")),
                no_watch: false,
            })
            .unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.watch_dir, Some(PathBuf::from("/other")));

        config
            .apply_watch_args(&WatchArgs {
                interval: None,
                watch_dir: Some(PathBuf::from("/ignored")),
                no_watch: true,
            })
            .unwrap();
        assert_eq!(config.watch_dir, None);
    }

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let loaded = FileConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(loaded, FileConfig::default());
    }
}
