use crate::model::{Selector, Target};
use crate::ConfigError;
use serde::Deserialize;

/// Main configuration structure for Sumi-Glean
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetEntry>,
}

impl Config {
    /// Builds validated targets, in configuration order
    ///
    /// # Errors
    ///
    /// * `ConfigError::NoTargets` - No `[[target]]` entries
    /// * `ConfigError::InvalidUrl` / `InvalidSelector` - The first bad entry
    pub fn build_targets(&self) -> Result<Vec<Target>, ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        self.targets.iter().map(TargetEntry::to_target).collect()
    }
}

/// Network behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Total time allowed for one request (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Number of targets processed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Attempts per content fetch, including the first
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between content fetch attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_concurrency() -> usize {
    4
}

fn default_max_attempts() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            concurrency: default_concurrency(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the gleaner
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the gleaner
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the gleaner
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for gleaner-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV file, overwritten on every run
    #[serde(rename = "csv-path", default = "default_csv_path")]
    pub csv_path: String,

    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Whether results are also appended to the database
    #[serde(rename = "store-in-database", default)]
    pub store_in_database: bool,
}

fn default_csv_path() -> String {
    "posts.csv".to_string()
}

fn default_database_path() -> String {
    "scraped_data.db".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            database_path: default_database_path(),
            store_in_database: false,
        }
    }
}

/// One `[[target]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct TargetEntry {
    /// Page address
    pub url: String,

    /// Element name to extract (e.g. "h1")
    pub tag: String,

    /// Optional class the element must carry
    #[serde(default)]
    pub class: Option<String>,
}

impl TargetEntry {
    pub fn to_target(&self) -> Result<Target, ConfigError> {
        let selector = Selector::new(&self.tag, self.class.as_deref())?;
        Target::new(&self.url, selector)
    }
}
