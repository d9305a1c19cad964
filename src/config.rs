use crate::defaults::{
    ENV_QUIZ_COUNT, ENV_STORE_PATH, MAX_SEARCH_RESULTS, MISTAKE_GRADUATION_STREAK, QUIZ_COUNT,
    REVIEW_INTERVALS_DAYS, SEARCH_FLOOR,
};
use crate::error::{Result, RouteDrillError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub search: SearchConfig,
    pub review: ReviewConfig,
    pub quiz: QuizConfig,
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding the library; `None` means the XDG data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Write the sample streets when the store file does not exist yet.
    pub seed: bool,
}

/// Single-query search configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub floor: f64,
    pub max_results: usize,
}

/// Review scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReviewConfig {
    pub intervals_days: Vec<f64>,
    pub graduation_streak: u32,
}

/// Quiz session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuizConfig {
    pub count: usize,
    /// Fixed seed for reproducible sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            seed: true,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            floor: SEARCH_FLOOR,
            max_results: MAX_SEARCH_RESULTS,
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            intervals_days: REVIEW_INTERVALS_DAYS.to_vec(),
            graduation_streak: MISTAKE_GRADUATION_STREAK,
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            count: QUIZ_COUNT,
            seed: None,
        }
    }
}

fn invalid(key: &str, message: impl Into<String>) -> RouteDrillError {
    RouteDrillError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    ///
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RouteDrillError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                RouteDrillError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Invalid TOML and invalid values are still errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(RouteDrillError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.review.intervals_days.is_empty() {
            return Err(invalid("review.intervals_days", "must list at least one interval"));
        }
        if let Some(bad) = self
            .review
            .intervals_days
            .iter()
            .find(|d| !d.is_finite() || **d <= 0.0)
        {
            return Err(invalid(
                "review.intervals_days",
                format!("intervals must be positive, got {bad}"),
            ));
        }
        if self.review.graduation_streak == 0 {
            return Err(invalid("review.graduation_streak", "must be at least 1"));
        }
        if self.search.max_results == 0 {
            return Err(invalid("search.max_results", "must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.search.floor) {
            return Err(invalid("search.floor", "must be between 0 and 100"));
        }
        if self.quiz.count == 0 {
            return Err(invalid("quiz.count", "must be at least 1"));
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - ROUTEDRILL_STORE → store.path
    /// - ROUTEDRILL_QUIZ_COUNT → quiz.count
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(ENV_STORE_PATH)
            && !path.is_empty()
        {
            self.store.path = Some(PathBuf::from(path));
        }

        if let Ok(count) = std::env::var(ENV_QUIZ_COUNT)
            && !count.is_empty()
        {
            match count.parse::<usize>() {
                Ok(n) if n > 0 => self.quiz.count = n,
                _ => warn!(value = %count, "ignoring invalid {ENV_QUIZ_COUNT}"),
            }
        }

        self
    }

    /// Where the record store lives.
    pub fn store_path(&self) -> PathBuf {
        self.store.path.clone().unwrap_or_else(Self::default_store_path)
    }

    /// Render as TOML, as `config init` writes it.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RouteDrillError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/routedrill/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("routedrill")
            .join("config.toml")
    }

    /// Returns ~/.local/share/routedrill/records.json on Linux
    pub fn default_store_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("routedrill")
            .join("records.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_routedrill_env() {
        remove_env(ENV_STORE_PATH);
        remove_env(ENV_QUIZ_COUNT);
    }

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.store.path, None);
        assert!(config.store.seed);
        assert_eq!(config.search.floor, 60.0);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.review.intervals_days, vec![0.5, 1.0, 3.0, 7.0, 15.0, 30.0]);
        assert_eq!(config.review.graduation_streak, 5);
        assert_eq!(config.quiz.count, 50);
        assert_eq!(config.quiz.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_file = write_temp(
            r#"
            [store]
            path = "/tmp/routes.json"
            seed = false

            [search]
            floor = 70.0
            max_results = 3

            [review]
            intervals_days = [1.0, 2.0]
            graduation_streak = 3

            [quiz]
            count = 20
            seed = 42
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.store.path, Some(PathBuf::from("/tmp/routes.json")));
        assert!(!config.store.seed);
        assert_eq!(config.search.floor, 70.0);
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.review.intervals_days, vec![1.0, 2.0]);
        assert_eq!(config.review.graduation_streak, 3);
        assert_eq!(config.quiz.count, 20);
        assert_eq!(config.quiz.seed, Some(42));
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let temp_file = write_temp(
            r#"
            [quiz]
            count = 10
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.quiz.count, 10);
        assert_eq!(config.search, SearchConfig::default());
        assert_eq!(config.review, ReviewConfig::default());
        assert!(config.store.seed);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            ("[review]\nintervals_days = []", "review.intervals_days"),
            ("[review]\nintervals_days = [1.0, -2.0]", "review.intervals_days"),
            ("[review]\ngraduation_streak = 0", "review.graduation_streak"),
            ("[search]\nmax_results = 0", "search.max_results"),
            ("[search]\nfloor = 120.0", "search.floor"),
            ("[quiz]\ncount = 0", "quiz.count"),
        ];
        for (toml, expected_key) in cases {
            let temp_file = write_temp(toml);
            match Config::load(temp_file.path()) {
                Err(RouteDrillError::ConfigInvalidValue { key, .. }) => {
                    assert_eq!(key, expected_key, "for {toml:?}")
                }
                other => panic!("expected invalid value for {toml:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_env_override_store_path() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_routedrill_env();

        set_env(ENV_STORE_PATH, "/data/streets.json");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.store_path(), PathBuf::from("/data/streets.json"));

        clear_routedrill_env();
    }

    #[test]
    fn test_env_override_quiz_count() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_routedrill_env();

        set_env(ENV_QUIZ_COUNT, "12");
        assert_eq!(Config::default().with_env_overrides().quiz.count, 12);

        set_env(ENV_QUIZ_COUNT, "lots");
        assert_eq!(
            Config::default().with_env_overrides().quiz.count,
            50,
            "unparseable count is ignored"
        );

        set_env(ENV_QUIZ_COUNT, "0");
        assert_eq!(Config::default().with_env_overrides().quiz.count, 50);

        clear_routedrill_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_routedrill_env();

        set_env(ENV_STORE_PATH, "");
        let config = Config::default().with_env_overrides();

        // Empty string should not override default
        assert_eq!(config.store.path, None);

        clear_routedrill_env();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let temp_file = write_temp(
            r#"
            [store
            path = "broken
        "#,
        );

        let result = Config::load(temp_file.path());

        assert!(matches!(result, Err(RouteDrillError::Config(_))));
    }

    #[test]
    fn test_default_path_is_xdg_compliant() {
        let path = Config::default_path();
        let path_str = path.to_string_lossy();

        assert!(path_str.contains("routedrill"));
        assert!(path_str.ends_with("config.toml"));
        assert!(Config::default_store_path().ends_with("routedrill/records.json"));
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let missing_path = Path::new("/tmp/nonexistent_routedrill_config_12345.toml");
        let config = Config::load_or_default(missing_path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_errors_on_invalid_toml() {
        let temp_file = write_temp("[search\nfloor = ");
        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = Config::default();
        config.quiz.seed = Some(7);
        let rendered = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
